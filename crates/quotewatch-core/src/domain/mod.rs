//! Canonical domain types shared by providers, the client and the display layer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, uppercase ticker |
//! | [`Stock`] | Quote snapshot; identity is the symbol |
//! | [`Watchlist`] | Ordered, symbol-unique list owned by the display layer |

mod stock;
mod symbol;
mod watchlist;

pub use stock::{Stock, UNKNOWN_COMPANY};
pub use symbol::Symbol;
pub use watchlist::Watchlist;
