//! Engine configuration.
//!
//! Values come from a `KEY=VALUE` properties file, then `QUOTEWATCH_<KEY>`
//! environment variables override individual keys:
//!
//! | Key | Default |
//! |-----|---------|
//! | `QUOTE_PROVIDER` | `alphavantage` |
//! | `ALPHA_VANTAGE_API_KEY` | required for `alphavantage` |
//! | `FMP_API_KEY` | required for `fmp` |
//! | `DAILY_REQUEST_LIMIT` | `250` |
//! | `POLL_INTERVAL_SECS` | `5` |
//! | `STREAM_QUOTA` | `metered` |
//! | `REQUEST_TIMEOUT_MS` | `5000` |
//!
//! Any failure here is fatal at startup.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::rate_limiter::DEFAULT_DAILY_LIMIT;
use crate::stream::DEFAULT_POLL_INTERVAL;
use crate::{ConfigError, ProviderId, StreamQuota, StreamSettings};

pub const DEFAULT_CONFIG_FILE: &str = "config.properties";
pub const ENV_PREFIX: &str = "QUOTEWATCH_";

pub const KEY_PROVIDER: &str = "QUOTE_PROVIDER";
pub const KEY_DAILY_LIMIT: &str = "DAILY_REQUEST_LIMIT";
pub const KEY_POLL_INTERVAL: &str = "POLL_INTERVAL_SECS";
pub const KEY_STREAM_QUOTA: &str = "STREAM_QUOTA";
pub const KEY_REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT_MS";

const KNOWN_KEYS: [&str; 7] = [
    KEY_PROVIDER,
    "ALPHA_VANTAGE_API_KEY",
    "FMP_API_KEY",
    KEY_DAILY_LIMIT,
    KEY_POLL_INTERVAL,
    KEY_STREAM_QUOTA,
    KEY_REQUEST_TIMEOUT,
];

/// Raw key/value pairs before validation.
pub type Properties = BTreeMap<String, String>;

#[derive(Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub provider: ProviderId,
    /// Credential for `provider`; `None` only for providers that need none.
    pub api_key: Option<String>,
    pub daily_request_limit: u32,
    pub poll_interval: Duration,
    pub stream_quota: StreamQuota,
    pub request_timeout_ms: u64,
}

impl EngineConfig {
    /// Loads `path` and applies `QUOTEWATCH_*` overrides from the process environment.
    pub fn from_properties_file(path: &Path) -> Result<Self, ConfigError> {
        let mut properties = read_properties(path)?;
        apply_env_overrides(&mut properties, std::env::vars());
        Self::from_properties(&properties)
    }

    /// Validates already-merged properties.
    pub fn from_properties(properties: &Properties) -> Result<Self, ConfigError> {
        let provider = match value(properties, KEY_PROVIDER) {
            Some(raw) => ProviderId::from_str(raw)?,
            None => ProviderId::Alphavantage,
        };

        let api_key = match provider.api_key_name() {
            Some(key) => Some(
                value(properties, key)
                    .map(str::to_owned)
                    .ok_or(ConfigError::MissingKey { key })?,
            ),
            None => None,
        };

        let daily_request_limit =
            parse_positive(properties, KEY_DAILY_LIMIT)?.unwrap_or(DEFAULT_DAILY_LIMIT);
        let poll_interval = parse_positive::<u64>(properties, KEY_POLL_INTERVAL)?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        let request_timeout_ms =
            parse_positive(properties, KEY_REQUEST_TIMEOUT)?.unwrap_or(DEFAULT_TIMEOUT_MS);
        let stream_quota = match value(properties, KEY_STREAM_QUOTA) {
            Some(raw) => StreamQuota::from_str(raw)?,
            None => StreamQuota::default(),
        };

        let config = Self {
            provider,
            api_key,
            daily_request_limit,
            poll_interval,
            stream_quota,
            request_timeout_ms,
        };
        debug!(?config, "engine configuration loaded");
        Ok(config)
    }

    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            interval: self.poll_interval,
            quota: self.stream_quota,
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("daily_request_limit", &self.daily_request_limit)
            .field("poll_interval", &self.poll_interval)
            .field("stream_quota", &self.stream_quota)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

/// Parses a `KEY=VALUE` file without touching the process environment.
pub fn read_properties(path: &Path) -> Result<Properties, ConfigError> {
    let display = path.display().to_string();
    if !path.is_file() {
        return Err(ConfigError::MissingFile { path: display });
    }

    let unreadable = |message: String| ConfigError::Unreadable {
        path: display.clone(),
        message,
    };

    let mut properties = Properties::new();
    for item in dotenvy::from_path_iter(path).map_err(|e| unreadable(e.to_string()))? {
        let (key, value) = item.map_err(|e| unreadable(e.to_string()))?;
        properties.insert(key, value);
    }
    Ok(properties)
}

/// Overlays `QUOTEWATCH_<KEY>` variables for known keys onto `properties`.
pub fn apply_env_overrides<I>(properties: &mut Properties, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (name, value) in vars {
        let Some(key) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        if KNOWN_KEYS.contains(&key) {
            debug!(key, "config key overridden from environment");
            properties.insert(key.to_owned(), value);
        }
    }
}

fn value<'a>(properties: &'a Properties, key: &str) -> Option<&'a str> {
    properties
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_positive<T>(properties: &Properties, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = value(properties, key) else {
        return Ok(None);
    };

    let invalid = |reason: &str| ConfigError::InvalidValue {
        key,
        value: raw.to_owned(),
        reason: reason.to_owned(),
    };

    let parsed = raw
        .parse::<T>()
        .map_err(|_| invalid("expected a whole number"))?;
    if parsed <= T::default() {
        return Err(invalid("must be greater than zero"));
    }
    Ok(Some(parsed))
}
