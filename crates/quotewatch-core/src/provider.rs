//! Quote provider contract and the per-call failure taxonomy.
//!
//! Every upstream source implements [`QuoteProvider`]: one outbound GET per
//! call, mapped into the canonical [`Stock`]. Provider-specific response
//! shapes never leak past this boundary.
//!
//! # Failures
//!
//! | Variant | Cause |
//! |---------|-------|
//! | [`FetchError::HttpError`] | Non-success HTTP status |
//! | [`FetchError::EmptyResult`] | Payload carried no quote |
//! | [`FetchError::ParseError`] | Malformed JSON or numbers |
//! | [`FetchError::NetworkFault`] | No response received |
//!
//! None of these are fatal; callers turn them into an absent result.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

use crate::adapters::{AlphaVantageProvider, FinancialModelingPrepProvider, YahooFinanceProvider};
use crate::http_client::HttpClient;
use crate::{CompanyDirectory, ConfigError, EngineConfig, ProviderId, Stock, Symbol};

/// Recoverable per-call failure raised at the provider boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("upstream returned HTTP status {0}")]
    HttpError(u16),

    #[error("upstream returned no quote data")]
    EmptyResult,

    #[error("failed to parse upstream response: {0}")]
    ParseError(String),

    #[error("network fault: {0}")]
    NetworkFault(String),
}

impl FetchError {
    /// Whether a later attempt can succeed without operator action.
    ///
    /// A rejected credential (401/403) stays rejected for the life of the process.
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::HttpError(401 | 403))
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::HttpError(_) => "fetch.http_error",
            Self::EmptyResult => "fetch.empty_result",
            Self::ParseError(_) => "fetch.parse_error",
            Self::NetworkFault(_) => "fetch.network_fault",
        }
    }
}

/// Snapshot quote source.
///
/// Implementations must be `Send + Sync`: one instance is shared by the
/// search path and every running price stream.
pub trait QuoteProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Fetches a single quote for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the upstream call fails or its payload
    /// cannot be mapped to a [`Stock`].
    fn fetch_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Stock, FetchError>> + Send + 'a>>;
}

/// Selects the configured provider variant.
///
/// # Errors
///
/// Returns [`ConfigError::MissingKey`] when the provider needs a credential
/// and `config` carries none.
pub fn build(
    config: &EngineConfig,
    http: Arc<dyn HttpClient>,
    names: Arc<dyn CompanyDirectory>,
) -> Result<Arc<dyn QuoteProvider>, ConfigError> {
    let api_key = || match (config.provider.api_key_name(), config.api_key.as_deref()) {
        (Some(_), Some(key)) => Ok(key.to_owned()),
        (Some(key), None) => Err(ConfigError::MissingKey { key }),
        (None, _) => Ok(String::new()),
    };

    let provider: Arc<dyn QuoteProvider> = match config.provider {
        ProviderId::Alphavantage => Arc::new(
            AlphaVantageProvider::new(http, api_key()?, names)
                .with_timeout_ms(config.request_timeout_ms),
        ),
        ProviderId::Fmp => Arc::new(
            FinancialModelingPrepProvider::new(http, api_key()?, names)
                .with_timeout_ms(config.request_timeout_ms),
        ),
        ProviderId::Yahoo => Arc::new(
            YahooFinanceProvider::new(http, names).with_timeout_ms(config.request_timeout_ms),
        ),
    };

    Ok(provider)
}
