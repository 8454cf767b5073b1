use crate::{Stock, Symbol};

/// Ordered, symbol-unique list of tracked stocks.
///
/// Owned by the display layer. Engine components never hold one; they only
/// hand out [`Stock`] snapshots and price ticks that the owner folds in here.
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    entries: Vec<Stock>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `stock` unless its symbol is already tracked.
    ///
    /// Returns `true` when the entry was added.
    pub fn add(&mut self, stock: Stock) -> bool {
        if self.contains(&stock.symbol) {
            return false;
        }
        self.entries.push(stock);
        true
    }

    pub fn remove(&mut self, symbol: &Symbol) -> Option<Stock> {
        let index = self.entries.iter().position(|s| &s.symbol == symbol)?;
        Some(self.entries.remove(index))
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.entries.iter().any(|s| &s.symbol == symbol)
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Stock> {
        self.entries.iter().find(|s| &s.symbol == symbol)
    }

    /// Replaces the displayed price for `symbol`. Unknown symbols are ignored.
    pub fn update_price(&mut self, symbol: &Symbol, price: f64) -> bool {
        match self.entries.iter_mut().find(|s| &s.symbol == symbol) {
            Some(entry) => {
                *entry = entry.with_price(price);
                true
            }
            None => false,
        }
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.entries.iter().map(|s| s.symbol.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stock> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
