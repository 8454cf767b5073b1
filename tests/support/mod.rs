//! Shared fakes for the behavior tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use quotewatch_core::{
    CompanyNameTable, DailyRateLimiter, FinancialModelingPrepProvider, HttpClient, HttpError,
    HttpRequest, HttpResponse, ManualClock, QuoteClient,
};
use time::macros::date;

pub type Scripted = Result<HttpResponse, HttpError>;

/// Fake transport: replays queued responses, then repeats a fallback,
/// recording every request it receives.
#[derive(Debug)]
pub struct ScriptedHttpClient {
    queue: Mutex<VecDeque<Scripted>>,
    fallback: Scripted,
    latency: Duration,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn always(response: Scripted) -> Self {
        Self::sequence(Vec::new(), response)
    }

    pub fn always_json(body: &str) -> Self {
        Self::always(Ok(HttpResponse::ok_json(body)))
    }

    pub fn sequence(responses: Vec<Scripted>, fallback: Scripted) -> Self {
        Self {
            queue: Mutex::new(responses.into()),
            fallback,
            latency: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every response is delayed by `latency` of tokio time.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .len()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        let response = self
            .queue
            .lock()
            .expect("queue should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        let latency = self.latency;

        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            response
        })
    }
}

pub fn fmp_profile(symbol: &str, name: &str, price: f64, changes: f64) -> String {
    format!(
        r#"[{{"symbol":"{symbol}","companyName":"{name}","price":{price},"changes":{changes}}}]"#
    )
}

pub fn status(code: u16) -> Scripted {
    Ok(HttpResponse::new(code, r#"{"message":"upstream error"}"#))
}

pub fn ok(body: &str) -> Scripted {
    Ok(HttpResponse::ok_json(body))
}

pub fn network_fault() -> Scripted {
    Err(HttpError::new("connection failed: connection refused"))
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(date!(2024 - 03 - 15)))
}

pub fn names() -> Arc<CompanyNameTable> {
    Arc::new(
        [("AAPL", "Apple Inc."), ("MSFT", "Microsoft Corporation")]
            .into_iter()
            .collect(),
    )
}

/// Client over the FMP adapter with a manual clock.
pub struct Harness {
    pub http: Arc<ScriptedHttpClient>,
    pub clock: Arc<ManualClock>,
    pub limiter: Arc<DailyRateLimiter>,
    pub client: QuoteClient,
}

impl Harness {
    pub fn new(http: ScriptedHttpClient, daily_limit: u32) -> Self {
        let http = Arc::new(http);
        let clock = clock();
        let limiter = Arc::new(DailyRateLimiter::with_clock(daily_limit, clock.clone()));
        let provider = Arc::new(FinancialModelingPrepProvider::new(
            http.clone(),
            "test-key",
            names(),
        ));
        let client = QuoteClient::new(provider, limiter.clone());

        Self {
            http,
            clock,
            limiter,
            client,
        }
    }
}
