use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{Symbol, ValidationError};

/// Display name used when neither the provider nor the name table knows the company.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Point-in-time quote snapshot for one ticker.
///
/// Two stocks with the same symbol compare equal regardless of price: the
/// symbol is the watchlist identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: Symbol,
    pub name: String,
    pub current_price: f64,
    pub change_percentage: f64,
}

impl Stock {
    pub fn new(
        symbol: Symbol,
        name: impl Into<String>,
        current_price: f64,
        change_percentage: f64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("current_price", current_price)?;
        if !change_percentage.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "change_percentage",
            });
        }

        let name = name.into();
        let name = if name.trim().is_empty() {
            UNKNOWN_COMPANY.to_owned()
        } else {
            name
        };

        Ok(Self {
            symbol,
            name,
            current_price,
            change_percentage,
        })
    }

    /// Returns a copy carrying a fresher price; name and change are kept.
    pub fn with_price(&self, current_price: f64) -> Self {
        Self {
            current_price,
            ..self.clone()
        }
    }
}

impl PartialEq for Stock {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Stock {}

impl Hash for Stock {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
