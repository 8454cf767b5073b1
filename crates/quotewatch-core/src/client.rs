use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    DailyRateLimiter, FetchError, ProviderId, QuoteProvider, Stock, StreamQuota, Symbol,
    ValidationError,
};

/// Detailed outcome of a failed lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("invalid symbol: {0}")]
    InvalidSymbol(#[from] ValidationError),

    #[error("daily request limit of {limit} reached; try again tomorrow")]
    RateLimitExceeded { limit: u32 },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl SearchError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidSymbol(_) => "search.invalid_symbol",
            Self::RateLimitExceeded { .. } => "search.rate_limited",
            Self::Fetch(inner) => inner.code(),
        }
    }
}

/// Single entry point for one-shot lookups.
///
/// Every admitted call consumes one unit of the shared daily quota before
/// the provider is contacted. Results are never cached.
#[derive(Clone)]
pub struct QuoteClient {
    provider: Arc<dyn QuoteProvider>,
    limiter: Arc<DailyRateLimiter>,
}

impl QuoteClient {
    pub fn new(provider: Arc<dyn QuoteProvider>, limiter: Arc<DailyRateLimiter>) -> Self {
        Self { provider, limiter }
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    pub fn quota(&self) -> &Arc<DailyRateLimiter> {
        &self.limiter
    }

    /// Looks up `raw` and collapses every failure into `None`.
    pub async fn search(&self, raw: &str) -> Option<Stock> {
        self.lookup(raw).await.ok()
    }

    /// Looks up `raw`, reporting why nothing came back.
    ///
    /// Blank or malformed symbols are rejected before the quota is touched.
    pub async fn lookup(&self, raw: &str) -> Result<Stock, SearchError> {
        let symbol = Symbol::parse(raw).inspect_err(|e| {
            debug!(input = raw, error = %e, "rejected symbol before lookup");
        })?;

        self.fetch(&symbol).await.inspect_err(|e| {
            if let SearchError::Fetch(fetch) = e {
                warn!(
                    symbol = %symbol,
                    provider = %self.provider.id(),
                    code = fetch.code(),
                    error = %fetch,
                    "quote lookup failed"
                );
            }
        })
    }

    /// Admits one call against the daily quota, then fetches `symbol`.
    pub async fn fetch(&self, symbol: &Symbol) -> Result<Stock, SearchError> {
        if !self.limiter.admit() {
            let limit = self.limiter.daily_limit();
            warn!(symbol = %symbol, limit, "daily request limit reached; try again tomorrow");
            return Err(SearchError::RateLimitExceeded { limit });
        }

        let stock = self.provider.fetch_quote(symbol).await?;
        debug!(
            symbol = %stock.symbol,
            price = stock.current_price,
            used = self.limiter.used_today(),
            "quote fetched"
        );
        Ok(stock)
    }

    /// Fetch used by price streams; `Unmetered` bypasses the daily counter.
    pub async fn poll(&self, symbol: &Symbol, quota: StreamQuota) -> Result<Stock, SearchError> {
        match quota {
            StreamQuota::Metered => self.fetch(symbol).await,
            StreamQuota::Unmetered => Ok(self.provider.fetch_quote(symbol).await?),
        }
    }
}

impl std::fmt::Debug for QuoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteClient")
            .field("provider", &self.provider.id())
            .field("limiter", &self.limiter)
            .finish()
    }
}
