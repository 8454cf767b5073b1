//! CLI argument definitions for quotewatch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `search` | One-shot quote lookup |
//! | `watch` | Stream prices for a watchlist |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | `config.properties` | Engine properties file |
//! | `--names` | none | JSON ticker → company name table |
//! | `--log-level` | `RUST_LOG` or `warn` | Log filter, written to stderr |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! # Examples
//!
//! ```bash
//! quotewatch search AAPL --pretty
//! quotewatch watch AAPL MSFT --duration-secs 60
//! QUOTEWATCH_QUOTE_PROVIDER=yahoo quotewatch watch TSLA
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quotewatch_core::config::DEFAULT_CONFIG_FILE;

/// Terminal watchlist backed by the quotewatch engine.
#[derive(Debug, Parser)]
#[command(name = "quotewatch", author, version, about = "Rate-limited stock quote watchlist")]
pub struct Cli {
    /// Properties file holding the provider credential and engine settings.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// JSON object mapping tickers to company names.
    #[arg(long, global = true)]
    pub names: Option<PathBuf>,

    /// Log filter such as `debug` or `quotewatch_core=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a single quote.
    ///
    ///   quotewatch search AAPL
    Search(SearchArgs),

    /// Add symbols to a watchlist and stream their prices.
    ///
    /// Runs until Ctrl-C or `--duration-secs`, then stops every stream.
    ///
    ///   quotewatch watch AAPL MSFT
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,

    /// Stop after this many seconds instead of waiting for Ctrl-C.
    #[arg(long)]
    pub duration_secs: Option<u64>,
}
