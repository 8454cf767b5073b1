use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::CliError;

const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber. Logs go to stderr; stdout carries data only.
///
/// `--log-level` wins over `RUST_LOG`, which wins over the default.
pub fn init(level: Option<&str>) -> Result<(), CliError> {
    let filter = match level {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| CliError::Logging(format!("invalid log level '{directive}': {e}")))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
