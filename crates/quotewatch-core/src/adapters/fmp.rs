use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use super::{build_stock, fetch_body, parse_json, RawNumber};
use crate::company::CompanyDirectory;
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::{FetchError, ProviderId, QuoteProvider, Stock, Symbol};

const BASE_URL: &str = "https://financialmodelingprep.com/api/v3/profile";

/// Financial Modeling Prep `profile` adapter.
#[derive(Clone)]
pub struct FinancialModelingPrepProvider {
    http: Arc<dyn HttpClient>,
    api_key: String,
    names: Arc<dyn CompanyDirectory>,
    timeout_ms: u64,
}

impl FinancialModelingPrepProvider {
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
            "{BASE_URL}/{}?apikey={}",
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(&self.api_key)
        );
        HttpRequest::get(endpoint).with_timeout_ms(self.timeout_ms)
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<Stock, FetchError> {
        let body = fetch_body(self.http.as_ref(), self.id(), self.quote_request(symbol)).await?;
        parse_profile(&body, symbol, self.names.as_ref())
    }
}

impl QuoteProvider for FinancialModelingPrepProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Fmp
    }

    fn fetch_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Stock, FetchError>> + Send + 'a>> {
        Box::pin(self.fetch(symbol))
    }
}

/// Profiles arrive as an array; rejected keys and unknown routes come back
/// as a bare object such as `{"Error Message": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfileResponse {
    Profiles(Vec<Profile>),
    Notice(serde_json::Map<String, serde_json::Value>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    price: Option<RawNumber>,
    #[serde(default)]
    changes_percentage: Option<RawNumber>,
    #[serde(default)]
    changes: Option<RawNumber>,
}

fn parse_profile(
    body: &str,
    requested: &Symbol,
    names: &dyn CompanyDirectory,
) -> Result<Stock, FetchError> {
    let profiles = match parse_json::<ProfileResponse>(ProviderId::Fmp, body)? {
        ProfileResponse::Profiles(profiles) => profiles,
        ProfileResponse::Notice(fields) => {
            tracing::debug!(symbol = %requested, keys = fields.len(), "fmp returned a notice instead of data");
            return Err(FetchError::EmptyResult);
        }
    };

    let profile = profiles.into_iter().next().ok_or(FetchError::EmptyResult)?;
    let price = profile
        .price
        .as_ref()
        .ok_or(FetchError::EmptyResult)?
        .value("price")?;

    // Both fields carry a plain percentage; the explicit one wins when present.
    let change = match (&profile.changes_percentage, &profile.changes) {
        (Some(raw), _) => raw.value("changesPercentage")?,
        (None, Some(raw)) => raw.value("changes")?,
        (None, None) => 0.0,
    };

    build_stock(
        requested,
        profile.symbol.as_deref(),
        profile.company_name,
        names,
        price,
        change,
    )
}
