// src/catalog.rs
use crate::error::DashboardError;
use crate::models::SymbolInfo;
use log::info;
use std::collections::HashMap;
use std::fs;

/// Symbol listed first in the selector.
pub const DEFAULT_SYMBOL: &str = "VOO";

/// Read-only symbol catalog, built once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    symbols: Vec<String>,
    entries: HashMap<String, SymbolInfo>,
}

impl Catalog {
    pub fn from_entries(items: Vec<SymbolInfo>) -> Self {
        let mut symbols: Vec<String> = Vec::with_capacity(items.len());
        let mut entries = HashMap::with_capacity(items.len());
        for item in items {
            if !entries.contains_key(&item.symbol) {
                symbols.push(item.symbol.clone());
            }
            entries.insert(item.symbol.clone(), item);
        }
        if let Some(pos) = symbols.iter().position(|s| s == DEFAULT_SYMBOL) {
            let voo = symbols.remove(pos);
            symbols.insert(0, voo);
        }
        Catalog { symbols, entries }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolInfo> {
        self.entries.get(symbol)
    }

    /// Entries in selector order.
    pub fn ordered(&self) -> Vec<&SymbolInfo> {
        self.symbols
            .iter()
            .filter_map(|s| self.entries.get(s))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

pub fn load_catalog(path: &str) -> Result<Catalog, DashboardError> {
    let raw = fs::read_to_string(path).map_err(|source| DashboardError::CatalogIo {
        path: path.to_string(),
        source,
    })?;
    let items: Vec<SymbolInfo> =
        serde_json::from_str(&raw).map_err(|source| DashboardError::CatalogFormat {
            path: path.to_string(),
            source,
        })?;
    let catalog = Catalog::from_entries(items);
    info!("Loaded {} symbols from {}", catalog.len(), path);
    Ok(catalog)
}

#[cfg(test)]
pub(crate) fn sample_catalog() -> Catalog {
    Catalog::from_entries(vec![
        SymbolInfo {
            symbol: "AAPL".to_string(),
            description: "Apple Inc.".to_string(),
        },
        SymbolInfo {
            symbol: "VOO".to_string(),
            description: "Vanguard S&P 500 ETF".to_string(),
        },
    ])
}
