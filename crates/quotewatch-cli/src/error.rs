use quotewatch_core::{ConfigError, SearchError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{symbol}: {source}")]
    Search {
        symbol: String,
        #[source]
        source: SearchError,
    },

    #[error("none of the requested symbols could be found")]
    EmptyWatchlist,

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 78,
            Self::Search { source, .. } => match source {
                SearchError::InvalidSymbol(_) => 2,
                SearchError::Fetch(_) => 3,
                SearchError::RateLimitExceeded { .. } => 4,
            },
            Self::EmptyWatchlist => 3,
            Self::Logging(_) => 6,
            Self::Serialization(_) => 5,
            Self::Io(_) => 10,
        }
    }
}
