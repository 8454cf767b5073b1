//! Stdout rendering. Logs never go through here.

use std::io::Write;

use quotewatch_core::{PriceTick, TickValue, Watchlist};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use crate::error::CliError;

pub fn render_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}

/// One NDJSON line per tick, so the output can be piped.
pub fn render_tick(tick: &PriceTick) -> Result<(), CliError> {
    render_json(tick, false)
}

pub fn render_watchlist(watchlist: &Watchlist) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(format_watchlist(watchlist).as_bytes())?;
    Ok(())
}

fn format_watchlist(watchlist: &Watchlist) -> String {
    let mut table = format!(
        "{:<8} {:<28} {:>12} {:>9}\n",
        "SYMBOL", "NAME", "PRICE", "CHANGE%"
    );
    for stock in watchlist.iter() {
        table.push_str(&format!(
            "{:<8} {:<28} {:>12.2} {:>+9.2}\n",
            stock.symbol.as_str(),
            truncate(&stock.name, 28),
            stock.current_price,
            stock.change_percentage
        ));
    }
    table
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Human-readable tick summary for log lines.
pub fn describe_tick(tick: &PriceTick) -> String {
    let at = tick
        .at
        .format(&Rfc3339)
        .unwrap_or_else(|_| tick.at.unix_timestamp().to_string());
    match &tick.value {
        TickValue::Price(price) => format!("{} #{} {price:.2} at {at}", tick.symbol, tick.seq),
        TickValue::Unavailable(reason) => {
            format!("{} #{} unavailable ({reason}) at {at}", tick.symbol, tick.seq)
        }
    }
}
