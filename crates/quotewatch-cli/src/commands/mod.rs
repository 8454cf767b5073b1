mod search;
mod watch;

use std::sync::Arc;

use quotewatch_core::{
    provider, CompanyDirectory, CompanyNameTable, DailyRateLimiter, EngineConfig, QuoteClient,
    ReqwestHttpClient, StreamRegistry,
};
use tracing::info;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Engine components wired once per invocation.
pub struct Engine {
    pub config: EngineConfig,
    pub client: QuoteClient,
}

impl Engine {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let config = EngineConfig::from_properties_file(&cli.config)?;

        let names: Arc<dyn CompanyDirectory> = match &cli.names {
            Some(path) => Arc::new(CompanyNameTable::from_json_file(path)?),
            None => Arc::new(CompanyNameTable::new()),
        };

        let provider = provider::build(&config, Arc::new(ReqwestHttpClient::new()), names)?;
        let limiter = Arc::new(DailyRateLimiter::new(config.daily_request_limit));
        info!(
            provider = %config.provider,
            daily_limit = config.daily_request_limit,
            stream_quota = %config.stream_quota,
            "engine ready"
        );

        Ok(Self {
            client: QuoteClient::new(provider, limiter),
            config,
        })
    }

    pub fn registry(&self) -> StreamRegistry {
        StreamRegistry::new(self.client.clone(), self.config.stream_settings())
    }
}

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let engine = Engine::from_cli(cli)?;

    match &cli.command {
        Command::Search(args) => search::run(args, &engine, cli.pretty).await,
        Command::Watch(args) => watch::run(args, &engine).await,
    }
}
