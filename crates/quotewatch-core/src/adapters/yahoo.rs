use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use super::{build_stock, fetch_body, parse_json};
use crate::company::CompanyDirectory;
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::{FetchError, ProviderId, QuoteProvider, Stock, Symbol};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance adapter reading the v8 chart `meta` block.
///
/// Needs no credential. Yahoo reports an absolute price, so the percent
/// change is derived from the previous close.
#[derive(Clone)]
pub struct YahooFinanceProvider {
    http: Arc<dyn HttpClient>,
    names: Arc<dyn CompanyDirectory>,
    timeout_ms: u64,
}

impl YahooFinanceProvider {
    pub fn new(http: Arc<dyn HttpClient>, names: Arc<dyn CompanyDirectory>) -> Self {
        Self {
            http,
            names,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn quote_request(&self, symbol: &Symbol) -> HttpRequest {
        let endpoint = format!(
            "{BASE_URL}/{}?range=1d&interval=1d",
            urlencoding::encode(symbol.as_str())
        );
        HttpRequest::get(endpoint)
            .with_header("Accept", "application/json")
            .with_timeout_ms(self.timeout_ms)
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<Stock, FetchError> {
        let body = fetch_body(self.http.as_ref(), self.id(), self.quote_request(symbol)).await?;
        parse_chart(&body, symbol, self.names.as_ref())
    }
}

impl QuoteProvider for YahooFinanceProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn fetch_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Stock, FetchError>> + Send + 'a>> {
        Box::pin(self.fetch(symbol))
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
}

fn parse_chart(
    body: &str,
    requested: &Symbol,
    names: &dyn CompanyDirectory,
) -> Result<Stock, FetchError> {
    let response: ChartResponse = parse_json(ProviderId::Yahoo, body)?;

    if let Some(error) = &response.chart.error {
        tracing::debug!(
            symbol = %requested,
            code = error.code.as_deref().unwrap_or_default(),
            description = error.description.as_deref().unwrap_or_default(),
            "yahoo chart returned an error object"
        );
        return Err(FetchError::EmptyResult);
    }

    let meta = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .map(|result| result.meta)
        .ok_or(FetchError::EmptyResult)?;

    let price = meta.regular_market_price.ok_or(FetchError::EmptyResult)?;
    let previous_close = meta.previous_close.or(meta.chart_previous_close);
    let change = percent_change(price, previous_close);
    let name = meta.long_name.or(meta.short_name);

    build_stock(requested, meta.symbol.as_deref(), name, names, price, change)
}

/// Percent move from `previous_close`; flat when no usable close is known.
fn percent_change(price: f64, previous_close: Option<f64>) -> f64 {
    match previous_close {
        Some(close) if close.is_finite() && close > 0.0 => (price - close) / close * 100.0,
        _ => 0.0,
    }
}
