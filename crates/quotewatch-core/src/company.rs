use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::{ConfigError, Symbol, UNKNOWN_COMPANY};

/// Read-only ticker → company name lookup supplied by the host application.
pub trait CompanyDirectory: Send + Sync {
    fn lookup(&self, symbol: &Symbol) -> Option<String>;
}

/// In-memory name table, typically loaded once at startup from a JSON object
/// such as `{"AAPL": "Apple Inc.", "MSFT": "Microsoft Corporation"}`.
#[derive(Debug, Clone, Default)]
pub struct CompanyNameTable {
    names: HashMap<String, String>,
}

impl CompanyNameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(raw.into_iter().collect())
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: display.clone(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json).map_err(|e| ConfigError::Unreadable {
            path: display,
            message: e.to_string(),
        })
    }

    pub fn insert(&mut self, ticker: impl AsRef<str>, name: impl Into<String>) {
        self.names
            .insert(ticker.as_ref().trim().to_ascii_uppercase(), name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for CompanyNameTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (ticker, name) in iter {
            table.insert(ticker, name);
        }
        table
    }
}

impl CompanyDirectory for CompanyNameTable {
    fn lookup(&self, symbol: &Symbol) -> Option<String> {
        self.names.get(symbol.as_str()).cloned()
    }
}

/// Picks the provider-supplied name, then the directory, then the sentinel.
pub(crate) fn resolve_name(
    provided: Option<String>,
    symbol: &Symbol,
    directory: &dyn CompanyDirectory,
) -> String {
    provided
        .filter(|name| !name.trim().is_empty())
        .or_else(|| directory.lookup(symbol))
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_owned())
}
