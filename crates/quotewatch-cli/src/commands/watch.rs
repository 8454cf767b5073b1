use std::time::Duration;

use quotewatch_core::{PriceTick, Watchlist};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cli::WatchArgs;
use crate::error::CliError;
use crate::output;

use super::Engine;

const MERGE_CHANNEL_CAPACITY: usize = 64;

pub async fn run(args: &WatchArgs, engine: &Engine) -> Result<(), CliError> {
    let mut watchlist = build_watchlist(args, engine).await;
    if watchlist.is_empty() {
        return Err(CliError::EmptyWatchlist);
    }

    let registry = engine.registry();
    let (tx, mut rx) = mpsc::channel::<PriceTick>(MERGE_CHANNEL_CAPACITY);
    let mut forwarders = JoinSet::new();

    for symbol in watchlist.symbols() {
        let mut ticks = registry.start(&symbol).subscribe();
        let tx = tx.clone();
        forwarders.spawn(async move {
            loop {
                match ticks.recv().await {
                    Ok(tick) => {
                        if tx.send(tick).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(symbol = %symbol, skipped, "tick consumer lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
    drop(tx);
    info!(symbols = watchlist.len(), "watching; press Ctrl-C to stop");

    let deadline = async {
        match args.duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let outcome = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break signal.map_err(CliError::from);
            }
            () = &mut deadline => break Ok(()),
            tick = rx.recv() => {
                let Some(tick) = tick else { break Ok(()) };
                if let Some(price) = tick.price() {
                    watchlist.update_price(&tick.symbol, price);
                }
                debug!(tick = %output::describe_tick(&tick), "tick received");
                if let Err(e) = output::render_tick(&tick) {
                    break Err(e);
                }
            }
        }
    };

    registry.shutdown().await;
    forwarders.abort_all();
    outcome?;

    output::render_watchlist(&watchlist)
}

/// Searches each requested symbol; misses are logged and skipped.
async fn build_watchlist(args: &WatchArgs, engine: &Engine) -> Watchlist {
    let mut watchlist = Watchlist::new();
    for raw in &args.symbols {
        match engine.client.lookup(raw).await {
            Ok(stock) => {
                let symbol = stock.symbol.clone();
                if !watchlist.add(stock) {
                    debug!(symbol = %symbol, "symbol already on watchlist");
                }
            }
            Err(e) => warn!(symbol = raw.as_str(), code = e.code(), error = %e, "skipping symbol"),
        }
    }
    watchlist
}
