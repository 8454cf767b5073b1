//! Daily request quota shared by searches and price streams.
//!
//! The window is a calendar day. The first admission on a new date resets the
//! counter; within a day the counter only grows and never passes the limit.
//! Requests over the limit are refused, not queued.

use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};

use time::{Date, OffsetDateTime};
use tracing::{debug, warn};

/// Default upstream free-tier allowance.
pub const DEFAULT_DAILY_LIMIT: u32 = 250;

/// Calendar date source used to detect window rollover.
pub trait Clock: Send + Sync + Debug {
    fn today(&self) -> Date;
}

/// Local calendar date, falling back to UTC when the offset is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
            .date()
    }
}

/// Settable clock for date-boundary tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    today: Mutex<Date>,
}

impl ManualClock {
    pub fn new(today: Date) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: Date) {
        *self.today.lock().unwrap_or_else(|p| p.into_inner()) = today;
    }

    /// Moves the clock forward by whole days.
    pub fn advance_days(&self, days: i64) {
        let mut today = self.today.lock().unwrap_or_else(|p| p.into_inner());
        *today = today.saturating_add(time::Duration::days(days));
    }
}

impl Clock for ManualClock {
    fn today(&self) -> Date {
        *self.today.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Call count for the current calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    pub count: u32,
    pub window_start: Date,
}

impl RateLimitWindow {
    fn starting(window_start: Date) -> Self {
        Self {
            count: 0,
            window_start,
        }
    }

    fn roll_to(&mut self, today: Date) {
        if self.window_start != today {
            debug!(
                previous = %self.window_start,
                today = %today,
                used = self.count,
                "daily request window reset"
            );
            *self = Self::starting(today);
        }
    }
}

/// Mutex-guarded daily admission counter.
#[derive(Debug)]
pub struct DailyRateLimiter {
    daily_limit: u32,
    window: Mutex<RateLimitWindow>,
    clock: Arc<dyn Clock>,
}

impl DailyRateLimiter {
    pub fn new(daily_limit: u32) -> Self {
        Self::with_clock(daily_limit, Arc::new(SystemClock))
    }

    pub fn with_clock(daily_limit: u32, clock: Arc<dyn Clock>) -> Self {
        let window = RateLimitWindow::starting(clock.today());
        Self {
            daily_limit,
            window: Mutex::new(window),
            clock,
        }
    }

    /// Recovers from poison: a stale count is preferable to a panic here.
    fn lock_window(&self) -> MutexGuard<'_, RateLimitWindow> {
        self.window.lock().unwrap_or_else(|poisoned| {
            warn!("rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Consumes one admission for today if any remain.
    pub fn admit(&self) -> bool {
        let today = self.clock.today();
        let mut window = self.lock_window();
        window.roll_to(today);

        if window.count < self.daily_limit {
            window.count += 1;
            true
        } else {
            false
        }
    }

    pub fn used_today(&self) -> u32 {
        let today = self.clock.today();
        let mut window = self.lock_window();
        window.roll_to(today);
        window.count
    }

    pub fn remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.used_today())
    }

    pub const fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    pub fn window(&self) -> RateLimitWindow {
        let today = self.clock.today();
        let mut window = self.lock_window();
        window.roll_to(today);
        *window
    }
}

impl Default for DailyRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_DAILY_LIMIT)
    }
}
