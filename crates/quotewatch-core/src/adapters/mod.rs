//! Upstream quote adapters.
//!
//! | Adapter | Endpoint | Percent change |
//! |---------|----------|----------------|
//! | [`AlphaVantageProvider`] | `GLOBAL_QUOTE` | `"1.2000%"` string |
//! | [`FinancialModelingPrepProvider`] | `profile` | raw percent |
//! | [`YahooFinanceProvider`] | v8 `chart` meta | derived from previous close |

mod alphavantage;
mod fmp;
mod yahoo;

pub use alphavantage::AlphaVantageProvider;
pub use fmp::FinancialModelingPrepProvider;
pub use yahoo::YahooFinanceProvider;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::company::{resolve_name, CompanyDirectory};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{FetchError, ProviderId, Stock, Symbol};

/// Issues `request` and returns the body of a successful response.
async fn fetch_body(
    http: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
) -> Result<String, FetchError> {
    debug!(provider = %provider, url = %request.redacted_url(), "requesting quote");

    let response = http
        .execute(request)
        .await
        .map_err(|e| FetchError::NetworkFault(e.message().to_owned()))?;

    if !response.is_success() {
        debug!(provider = %provider, status = response.status, "upstream rejected quote request");
        return Err(FetchError::HttpError(response.status));
    }
    if response.body.trim().is_empty() {
        return Err(FetchError::EmptyResult);
    }

    Ok(response.body)
}

fn parse_json<T: DeserializeOwned>(provider: ProviderId, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body)
        .map_err(|e| FetchError::ParseError(format!("invalid {provider} payload: {e}")))
}

/// Numeric field that upstreams send either as a JSON number or as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn value(&self, field: &str) -> Result<f64, FetchError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(text) => parse_decimal(field, text),
        }
    }
}

fn parse_decimal(field: &str, text: &str) -> Result<f64, FetchError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| FetchError::ParseError(format!("field '{field}' is not a number: '{text}'")))
}

/// Parses `"1.2000%"`, `"-0.35 %"` or `"1.2"` into a plain signed percentage.
fn parse_percent(field: &str, text: &str) -> Result<f64, FetchError> {
    let trimmed = text.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed);
    parse_decimal(field, digits)
}

/// Maps provider fields into the canonical [`Stock`].
///
/// The provider's confirmed symbol wins when it parses; otherwise the
/// requested one is echoed.
fn build_stock(
    requested: &Symbol,
    confirmed: Option<&str>,
    provided_name: Option<String>,
    names: &dyn CompanyDirectory,
    current_price: f64,
    change_percentage: f64,
) -> Result<Stock, FetchError> {
    let symbol = confirmed
        .and_then(|raw| Symbol::parse(raw).ok())
        .unwrap_or_else(|| requested.clone());
    let name = resolve_name(provided_name, &symbol, names);

    Stock::new(symbol, name, current_price, change_percentage)
        .map_err(|e| FetchError::ParseError(e.to_string()))
}
