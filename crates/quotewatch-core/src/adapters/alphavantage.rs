use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use super::{build_stock, fetch_body, parse_json, parse_percent, RawNumber};
use crate::company::CompanyDirectory;
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::{FetchError, ProviderId, QuoteProvider, Stock, Symbol};

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage `GLOBAL_QUOTE` adapter.
#[derive(Clone)]
pub struct AlphaVantageProvider {
    http: Arc<dyn HttpClient>,
    api_key: String,
    names: Arc<dyn CompanyDirectory>,
    timeout_ms: u64,
}

impl AlphaVantageProvider {
    pub fn new(
        http: Arc<dyn HttpClient>,
        api_key: impl Into<String>,
        names: Arc<dyn CompanyDirectory>,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
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
            "{BASE_URL}?function=GLOBAL_QUOTE&symbol={}&apikey={}",
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(&self.api_key)
        );
        HttpRequest::get(endpoint).with_timeout_ms(self.timeout_ms)
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<Stock, FetchError> {
        let body = fetch_body(self.http.as_ref(), self.id(), self.quote_request(symbol)).await?;
        parse_global_quote(&body, symbol, self.names.as_ref())
    }
}

impl QuoteProvider for AlphaVantageProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn fetch_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Stock, FetchError>> + Send + 'a>> {
        Box::pin(self.fetch(symbol))
    }
}

// Throttled or invalid calls come back as HTTP 200 with a notice instead of
// "Global Quote", so those keys are captured only to be rejected.
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    quote: Option<GlobalQuote>,
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Information", default)]
    information: Option<String>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
}

impl GlobalQuoteResponse {
    fn notice(&self) -> Option<&str> {
        self.note
            .as_deref()
            .or(self.information.as_deref())
            .or(self.error_message.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol", default)]
    symbol: Option<String>,
    #[serde(rename = "05. price", default)]
    price: Option<RawNumber>,
    #[serde(rename = "10. change percent", default)]
    change_percent: Option<String>,
}

fn parse_global_quote(
    body: &str,
    requested: &Symbol,
    names: &dyn CompanyDirectory,
) -> Result<Stock, FetchError> {
    let response: GlobalQuoteResponse = parse_json(ProviderId::Alphavantage, body)?;

    if let Some(notice) = response.notice() {
        tracing::debug!(symbol = %requested, notice, "alphavantage returned a notice instead of data");
        return Err(FetchError::EmptyResult);
    }

    let quote = response.quote.ok_or(FetchError::EmptyResult)?;
    let price = quote
        .price
        .as_ref()
        .ok_or(FetchError::EmptyResult)?
        .value("05. price")?;
    let change = match quote.change_percent.as_deref() {
        Some(text) => parse_percent("10. change percent", text)?,
        None => 0.0,
    };

    build_stock(requested, quote.symbol.as_deref(), None, names, price, change)
}
