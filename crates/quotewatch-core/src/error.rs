use thiserror::Error;

/// Validation errors raised while parsing user-supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid provider '{value}', expected one of alphavantage, fmp, yahoo")]
    InvalidProvider { value: String },
    #[error("invalid stream quota '{value}', expected one of metered, unmetered")]
    InvalidStreamQuota { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
}

/// Startup configuration failures. These are the only errors allowed to halt the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}; create a config.properties file")]
    MissingFile { path: String },

    #[error("failed to read config file {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("required config key '{key}' is not set")]
    MissingKey { key: &'static str },

    #[error("config key '{key}' has invalid value '{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
