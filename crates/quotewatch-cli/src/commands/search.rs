use quotewatch_core::{ProviderId, Stock};
use serde::Serialize;

use crate::cli::SearchArgs;
use crate::error::CliError;
use crate::output;

use super::Engine;

#[derive(Debug, Serialize)]
struct QuotaUsage {
    used: u32,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct SearchResponseData {
    provider: ProviderId,
    stock: Stock,
    quota: QuotaUsage,
}

pub async fn run(args: &SearchArgs, engine: &Engine, pretty: bool) -> Result<(), CliError> {
    let stock = engine
        .client
        .lookup(&args.symbol)
        .await
        .map_err(|source| CliError::Search {
            symbol: args.symbol.trim().to_owned(),
            source,
        })?;

    let quota = engine.client.quota();
    output::render_json(
        &SearchResponseData {
            provider: engine.client.provider_id(),
            stock,
            quota: QuotaUsage {
                used: quota.used_today(),
                limit: quota.daily_limit(),
            },
        },
        pretty,
    )
}
