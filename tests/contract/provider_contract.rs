#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use quotewatch_core::{
    AlphaVantageProvider, FetchError, FinancialModelingPrepProvider, ProviderId, QuoteProvider,
    Symbol, YahooFinanceProvider, UNKNOWN_COMPANY,
};

use support::{names, network_fault, ok, status, ScriptedHttpClient};

struct ProviderCase {
    id: ProviderId,
    success_body: &'static str,
    expected_change: f64,
}

fn provider_cases() -> Vec<ProviderCase> {
    vec![
        ProviderCase {
            id: ProviderId::Alphavantage,
            success_body: r#"{"Global Quote":{"01. symbol":"AAPL","05. price":"150.0000","10. change percent":"1.2000%"}}"#,
            expected_change: 1.2,
        },
        ProviderCase {
            id: ProviderId::Fmp,
            success_body: r#"[{"symbol":"AAPL","companyName":"Apple Inc.","price":150.0,"changes":1.2}]"#,
            expected_change: 1.2,
        },
        ProviderCase {
            id: ProviderId::Yahoo,
            success_body: r#"{"chart":{"result":[{"meta":{"symbol":"AAPL","regularMarketPrice":150.0,"previousClose":125.0}}],"error":null}}"#,
            expected_change: 20.0,
        },
    ]
}

fn provider_for(id: ProviderId, http: Arc<ScriptedHttpClient>) -> Arc<dyn QuoteProvider> {
    match id {
        ProviderId::Alphavantage => Arc::new(AlphaVantageProvider::new(http, "alpha-key", names())),
        ProviderId::Fmp => Arc::new(FinancialModelingPrepProvider::new(http, "fmp-key", names())),
        ProviderId::Yahoo => Arc::new(YahooFinanceProvider::new(http, names())),
    }
}

fn aapl() -> Symbol {
    Symbol::parse("AAPL").expect("valid symbol")
}

#[tokio::test]
async fn quote_maps_to_canonical_stock_for_all_providers() {
    for case in provider_cases() {
        let http = Arc::new(ScriptedHttpClient::always(ok(case.success_body)));
        let provider = provider_for(case.id, http.clone());

        let stock = provider
            .fetch_quote(&aapl())
            .await
            .unwrap_or_else(|error| panic!("provider '{}' quote failed: {error}", case.id));

        assert_eq!(provider.id(), case.id);
        assert_eq!(stock.symbol.as_str(), "AAPL", "provider '{}': symbol", case.id);
        assert_eq!(stock.name, "Apple Inc.", "provider '{}': name", case.id);
        assert_eq!(stock.current_price, 150.0, "provider '{}': price", case.id);
        assert!(
            (stock.change_percentage - case.expected_change).abs() < 1e-9,
            "provider '{}': change {}",
            case.id,
            stock.change_percentage
        );
        assert_eq!(http.request_count(), 1, "provider '{}': one GET per call", case.id);
    }
}

#[tokio::test]
async fn non_success_status_maps_to_http_error_for_all_providers() {
    for case in provider_cases() {
        for code in [401, 404, 429, 500, 503] {
            let provider = provider_for(case.id, Arc::new(ScriptedHttpClient::always(status(code))));
            assert_eq!(
                provider.fetch_quote(&aapl()).await,
                Err(FetchError::HttpError(code)),
                "provider '{}' status {code}",
                case.id
            );
        }
    }
}

#[tokio::test]
async fn transport_failure_maps_to_network_fault_for_all_providers() {
    for case in provider_cases() {
        let provider = provider_for(case.id, Arc::new(ScriptedHttpClient::always(network_fault())));
        let error = provider
            .fetch_quote(&aapl())
            .await
            .expect_err("transport failure must surface");

        assert!(
            matches!(error, FetchError::NetworkFault(ref message) if message.contains("connection refused")),
            "provider '{}': {error:?}",
            case.id
        );
    }
}

#[tokio::test]
async fn malformed_json_maps_to_parse_error_for_all_providers() {
    for case in provider_cases() {
        let provider = provider_for(case.id, Arc::new(ScriptedHttpClient::always_json("{not json")));
        assert!(
            matches!(provider.fetch_quote(&aapl()).await, Err(FetchError::ParseError(_))),
            "provider '{}'",
            case.id
        );
    }
}

#[tokio::test]
async fn blank_body_maps_to_empty_result_for_all_providers() {
    for case in provider_cases() {
        let provider = provider_for(case.id, Arc::new(ScriptedHttpClient::always_json("  ")));
        assert_eq!(
            provider.fetch_quote(&aapl()).await,
            Err(FetchError::EmptyResult),
            "provider '{}'",
            case.id
        );
    }
}

#[tokio::test]
async fn credentials_travel_only_to_keyed_providers() {
    for case in provider_cases() {
        let http = Arc::new(ScriptedHttpClient::always(ok(case.success_body)));
        let provider = provider_for(case.id, http.clone());
        provider.fetch_quote(&aapl()).await.expect("quote should succeed");

        let request = &http.requests()[0];
        assert!(request.url.contains("AAPL"), "provider '{}': {}", case.id, request.url);
        match case.id.api_key_name() {
            Some(_) => {
                assert!(request.url.contains("apikey="), "provider '{}'", case.id);
                assert!(
                    request.redacted_url().ends_with("apikey=***"),
                    "provider '{}': {}",
                    case.id,
                    request.redacted_url()
                );
            }
            None => assert!(!request.url.contains("apikey"), "provider '{}'", case.id),
        }
    }
}

#[tokio::test]
async fn provider_symbol_is_echoed_and_unknown_names_fall_back() {
    let http = Arc::new(ScriptedHttpClient::always(ok(
        r#"{"Global Quote":{"01. symbol":"ZZZZ","05. price":"3.5000","10. change percent":"-2.5000%"}}"#,
    )));
    let provider = provider_for(ProviderId::Alphavantage, http);

    let stock = provider
        .fetch_quote(&Symbol::parse("zzzz").expect("valid symbol"))
        .await
        .expect("quote should succeed");

    assert_eq!(stock.symbol.as_str(), "ZZZZ");
    assert_eq!(stock.name, UNKNOWN_COMPANY);
    assert_eq!(stock.change_percentage, -2.5);
}
