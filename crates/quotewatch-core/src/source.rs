use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Upstream quote sources the engine can be configured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Alphavantage,
    Fmp,
    Yahoo,
}

impl ProviderId {
    pub const ALL: [Self; 3] = [Self::Alphavantage, Self::Fmp, Self::Yahoo];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alphavantage => "alphavantage",
            Self::Fmp => "fmp",
            Self::Yahoo => "yahoo",
        }
    }

    /// Config key holding this provider's credential, if it needs one.
    pub const fn api_key_name(self) -> Option<&'static str> {
        match self {
            Self::Alphavantage => Some("ALPHA_VANTAGE_API_KEY"),
            Self::Fmp => Some("FMP_API_KEY"),
            Self::Yahoo => None,
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "alphavantage" | "alpha_vantage" => Ok(Self::Alphavantage),
            "fmp" | "financialmodelingprep" => Ok(Self::Fmp),
            "yahoo" => Ok(Self::Yahoo),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}
