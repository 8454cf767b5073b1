//! # Quotewatch Core
//!
//! Quote acquisition and price streaming engine for watchlist displays.
//!
//! ## Overview
//!
//! - **One-shot lookups** through [`QuoteClient`], metered by a shared
//!   [`DailyRateLimiter`]
//! - **Interchangeable upstreams** behind the [`QuoteProvider`] trait
//!   (Alpha Vantage, Financial Modeling Prep, Yahoo Finance)
//! - **Per-symbol price streams** owned by a [`StreamRegistry`], cancellable
//!   and never emitting after they are stopped
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider implementations |
//! | [`client`] | Metered lookups |
//! | [`company`] | Ticker → company name lookup |
//! | [`config`] | Properties file + environment configuration |
//! | [`domain`] | `Symbol`, `Stock`, `Watchlist` |
//! | [`error`] | Validation and configuration errors |
//! | [`http_client`] | Transport abstraction |
//! | [`provider`] | Provider trait, fetch errors, variant selection |
//! | [`rate_limiter`] | Daily admission counter |
//! | [`registry`] | Stream ownership and teardown |
//! | [`source`] | Provider identifiers |
//! | [`stream`] | Polling task, ticks and handles |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quotewatch_core::{
//!     provider, CompanyNameTable, DailyRateLimiter, EngineConfig, QuoteClient,
//!     ReqwestHttpClient, StreamRegistry,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::from_properties_file("config.properties".as_ref())?;
//!     let provider = provider::build(
//!         &config,
//!         Arc::new(ReqwestHttpClient::new()),
//!         Arc::new(CompanyNameTable::new()),
//!     )?;
//!     let limiter = Arc::new(DailyRateLimiter::new(config.daily_request_limit));
//!     let client = QuoteClient::new(provider, limiter);
//!
//!     if let Some(stock) = client.search("AAPL").await {
//!         let registry = StreamRegistry::new(client.clone(), config.stream_settings());
//!         let mut ticks = registry.start(&stock.symbol).subscribe();
//!         println!("{:?}", ticks.recv().await?);
//!         registry.shutdown().await;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Only [`ConfigError`] is fatal, and only at startup. Lookups fail with
//! [`SearchError`]; streams turn failures into
//! [`TickValue::Unavailable`] and keep running, except when the upstream
//! rejects the credential.
//!
//! ## Security
//!
//! - API keys never appear in logs; request URLs are redacted first
//! - Symbols are validated before any network call or quota use

pub mod adapters;
pub mod client;
pub mod company;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod provider;
pub mod rate_limiter;
pub mod registry;
pub mod source;
pub mod stream;

pub use adapters::{AlphaVantageProvider, FinancialModelingPrepProvider, YahooFinanceProvider};

pub use client::{QuoteClient, SearchError};

pub use company::{CompanyDirectory, CompanyNameTable};

pub use config::EngineConfig;

pub use domain::{Stock, Symbol, Watchlist, UNKNOWN_COMPANY};

pub use error::{ConfigError, ValidationError};

pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

pub use provider::{FetchError, QuoteProvider};

pub use rate_limiter::{Clock, DailyRateLimiter, ManualClock, RateLimitWindow, SystemClock};

pub use registry::StreamRegistry;

pub use source::ProviderId;

pub use stream::{
    PriceStream, PriceTick, StreamHandle, StreamQuota, StreamSettings, StreamState, TickValue,
};
