//! Per-symbol polling task.
//!
//! A [`PriceStream`] loops fetch → emit → wait until its token is cancelled.
//! The token is raced against both the fetch and the wait, and checked once
//! more right before each emission, so no tick is sent after cancellation is
//! observed. [`StreamHandle::stop`] additionally awaits task exit: once it
//! returns, the stream can never emit again.
//!
//! States: `Idle → Running → (Cancelled | Faulted)`, and back to `Idle` once
//! the handle has been stopped.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{QuoteClient, SearchError, Symbol, ValidationError};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

const TICK_CHANNEL_CAPACITY: usize = 64;

/// Whether stream ticks draw from the shared daily quota.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamQuota {
    /// Every tick consumes one admission; refused ticks emit `Unavailable`.
    #[default]
    Metered,
    /// Ticks bypass the counter.
    Unmetered,
}

impl StreamQuota {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metered => "metered",
            Self::Unmetered => "unmetered",
        }
    }
}

impl Display for StreamQuota {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamQuota {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "metered" => Ok(Self::Metered),
            "unmetered" => Ok(Self::Unmetered),
            _ => Err(ValidationError::InvalidStreamQuota {
                value: value.to_owned(),
            }),
        }
    }
}

/// Polling cadence and quota policy shared by every stream of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub interval: Duration,
    pub quota: StreamQuota,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            quota: StreamQuota::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    Idle,
    Running,
    Cancelled,
    Faulted,
}

impl StreamState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Cancelled => "cancelled",
            Self::Faulted => "faulted",
        }
    }
}

impl Display for StreamState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TickValue {
    Price(f64),
    /// Fetch failed or was refused; carries the reason.
    Unavailable(String),
}

/// One emission of a price stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub symbol: Symbol,
    /// 1-based, gap-free per stream.
    pub seq: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub value: TickValue,
}

impl PriceTick {
    pub fn price(&self) -> Option<f64> {
        match self.value {
            TickValue::Price(price) => Some(price),
            TickValue::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.price().is_some()
    }
}

/// Repeating quote poller bound to one symbol. Consumed by [`PriceStream::spawn`].
pub struct PriceStream {
    symbol: Symbol,
    client: QuoteClient,
    settings: StreamSettings,
    token: CancellationToken,
    ticks: broadcast::Sender<PriceTick>,
    latest: Arc<watch::Sender<Option<PriceTick>>>,
    state: Arc<watch::Sender<StreamState>>,
}

impl PriceStream {
    pub fn new(symbol: Symbol, client: QuoteClient, settings: StreamSettings) -> Self {
        let (ticks, _) = broadcast::channel(TICK_CHANNEL_CAPACITY);
        let (latest, _) = watch::channel(None);
        let (state, _) = watch::channel(StreamState::Idle);

        Self {
            symbol,
            client,
            settings,
            token: CancellationToken::new(),
            ticks,
            latest: Arc::new(latest),
            state: Arc::new(state),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    /// Starts polling on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(self) -> StreamHandle {
        let handle = StreamHandle {
            symbol: self.symbol.clone(),
            token: self.token.clone(),
            ticks: self.ticks.clone(),
            latest: Arc::clone(&self.latest),
            state: Arc::clone(&self.state),
            task: Mutex::new(None),
        };

        self.state.send_replace(StreamState::Running);
        let task = tokio::spawn(self.run());
        *handle.task.lock().unwrap_or_else(|p| p.into_inner()) = Some(task);
        handle
    }

    async fn run(self) {
        info!(
            symbol = %self.symbol,
            interval_ms = self.settings.interval.as_millis() as u64,
            quota = %self.settings.quota,
            "price stream started"
        );

        let mut seq = 0_u64;
        loop {
            let outcome = tokio::select! {
                biased;
                () = self.token.cancelled() => break,
                outcome = self.client.poll(&self.symbol, self.settings.quota) => outcome,
            };

            let (value, fault) = match outcome {
                Ok(stock) => (TickValue::Price(stock.current_price), None),
                Err(SearchError::Fetch(e)) if !e.is_transient() => {
                    (TickValue::Unavailable(e.to_string()), Some(e))
                }
                Err(e) => {
                    warn!(symbol = %self.symbol, code = e.code(), error = %e, "price tick unavailable");
                    (TickValue::Unavailable(e.to_string()), None)
                }
            };

            if self.token.is_cancelled() {
                break;
            }
            seq += 1;
            self.emit(PriceTick {
                symbol: self.symbol.clone(),
                seq,
                at: OffsetDateTime::now_utc(),
                value,
            });

            if let Some(e) = fault {
                error!(symbol = %self.symbol, error = %e, "price stream faulted; credential rejected");
                self.state.send_replace(StreamState::Faulted);
                return;
            }

            tokio::select! {
                biased;
                () = self.token.cancelled() => break,
                () = tokio::time::sleep(self.settings.interval) => {}
            }
        }

        self.state.send_replace(StreamState::Cancelled);
        info!(symbol = %self.symbol, emitted = seq, "price stream cancelled");
    }

    fn emit(&self, tick: PriceTick) {
        self.latest.send_replace(Some(tick.clone()));
        // No subscribers is fine; `latest` still records the tick.
        let _ = self.ticks.send(tick);
    }
}

/// Control handle for a spawned [`PriceStream`].
///
/// Dropping the handle cancels the stream.
#[derive(Debug)]
pub struct StreamHandle {
    symbol: Symbol,
    token: CancellationToken,
    ticks: broadcast::Sender<PriceTick>,
    latest: Arc<watch::Sender<Option<PriceTick>>>,
    state: Arc<watch::Sender<StreamState>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StreamHandle {
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Receives every tick emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<PriceTick> {
        self.ticks.subscribe()
    }

    /// Most recent tick, for subscribers that joined late.
    pub fn latest(&self) -> Option<PriceTick> {
        self.latest.borrow().clone()
    }

    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<StreamState> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.state() == StreamState::Running
    }

    /// Requests cancellation without waiting for the task to exit.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancels the stream and waits for its task to exit.
    ///
    /// No tick is emitted once this returns. Calling it again is a no-op.
    pub async fn stop(&self) {
        self.token.cancel();

        let task = self.task.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                if e.is_panic() {
                    error!(symbol = %self.symbol, "price stream task panicked");
                }
            }
        }

        self.state.send_replace(StreamState::Idle);
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
