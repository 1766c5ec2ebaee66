//! Feature selection from the catalog of historically profitable
//! configurations.

use crate::error::{AppError, Result};
use crate::types::{CatalogRow, FeatureCatalogEntry};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

/// Features used for symbols with no catalog entry, ordered by how often
/// they appeared in profitable strategies.
pub const UNIVERSAL_FEATURES: [&str; 7] = [
    "atr_ratio",
    "returns_std_50",
    "volume_mean_50",
    "volume_std_50",
    "volume_std_20",
    "macd_signal",
    "returns_mean_50",
];

/// Catalog entries keyed by (symbol, timeframe). Later duplicates replace
/// earlier ones.
#[derive(Debug, Clone, Default)]
pub struct FeatureCatalog {
    entries: BTreeMap<(String, String), FeatureCatalogEntry>,
}

impl FeatureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a catalog CSV from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| AppError::CatalogLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a catalog CSV. Rows that fail to parse or validate are skipped
    /// whole; only an unreadable header is an error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);
        csv_reader.headers()?;

        let mut catalog = Self::new();
        let mut rejected = 0usize;

        for (line, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            let row = match record {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping unreadable catalog row {}: {}", line + 1, e);
                    rejected += 1;
                    continue;
                }
            };

            match FeatureCatalogEntry::try_from(row) {
                Ok(entry) => catalog.insert(entry),
                Err(reason) => {
                    warn!("Skipping catalog row {}: {}", line + 1, reason);
                    rejected += 1;
                }
            }
        }

        info!(
            "Loaded {} profitable symbol configurations ({} rows skipped)",
            catalog.len(),
            rejected
        );
        Ok(catalog)
    }

    pub fn insert(&mut self, entry: FeatureCatalogEntry) {
        let key = (entry.symbol.clone(), entry.timeframe.clone());
        self.entries.insert(key, entry);
    }

    pub fn get(&self, symbol: &str, timeframe: &str) -> Option<&FeatureCatalogEntry> {
        self.entries
            .get(&(symbol.to_string(), timeframe.to_string()))
    }

    /// Most profitable entry for a symbol across all timeframes. Ties keep
    /// the first entry in timeframe order.
    pub fn best_for_symbol(&self, symbol: &str) -> Option<&FeatureCatalogEntry> {
        self.entries
            .values()
            .filter(|e| e.symbol == symbol)
            .fold(None, |best: Option<&FeatureCatalogEntry>, e| match best {
                Some(b) if b.profitability_score >= e.profitability_score => Some(b),
                _ => Some(e),
            })
    }

    pub fn entries(&self) -> impl Iterator<Item = &FeatureCatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves which features to compute for a symbol/timeframe.
#[derive(Debug, Clone, Default)]
pub struct FeatureSelector {
    catalog: FeatureCatalog,
}

impl FeatureSelector {
    pub fn new(catalog: FeatureCatalog) -> Self {
        Self { catalog }
    }

    /// Build from an optional catalog file. A missing or unreadable file
    /// degrades to an empty catalog, so every symbol uses the universal
    /// features.
    pub fn from_path(path: Option<&Path>) -> Self {
        let catalog = match path {
            Some(path) => FeatureCatalog::load(path).unwrap_or_else(|e| {
                warn!("Failed to load feature catalog: {}", e);
                FeatureCatalog::new()
            }),
            None => {
                info!("No feature catalog configured, using universal features");
                FeatureCatalog::new()
            }
        };
        Self::new(catalog)
    }

    /// Features for a symbol/timeframe: exact catalog match, else the
    /// symbol's most profitable configuration, else the universal set.
    pub fn get_features(&self, symbol: &str, timeframe: &str) -> Vec<String> {
        if let Some(entry) = self.catalog.get(symbol, timeframe) {
            return entry.features.clone();
        }

        if let Some(entry) = self.catalog.best_for_symbol(symbol) {
            return entry.features.clone();
        }

        UNIVERSAL_FEATURES.iter().map(|f| f.to_string()).collect()
    }

    /// Distinct symbols with at least one profitable configuration.
    pub fn profitable_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.catalog.entries().map(|e| e.symbol.clone()).collect();
        symbols.dedup();
        symbols
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_CSV: &str = "\
symbol,timeframe,top_features,win_rate,sharpe_ratio,profitability_score
DOGEUSDT,15m,\"rsi, macd_hist, bb_width\",0.62,1.8,2.5
DOGEUSDT,1h,\"atr_ratio,volume_ratio\",0.55,1.1,3.1
DOGEUSDT,4h,\"returns_mean_10\",0.51,0.4,1.2
PEPEUSDT,5m,,0.7,2.0,4.0
SHIBUSDT,5m,\"rsi_7\",0.4,-0.2,-1.0
XRPUSDT,30m,\"bb_position\",nan,,0.9
XRPUSDT,30m,\"sma7_sma25_ratio\",0.58,1.3,1.4
";

    fn selector() -> FeatureSelector {
        FeatureSelector::new(FeatureCatalog::from_reader(CATALOG_CSV.as_bytes()).unwrap())
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(
            selector().get_features("DOGEUSDT", "15m"),
            vec!["rsi", "macd_hist", "bb_width"]
        );
    }

    #[test]
    fn test_symbol_fallback_uses_most_profitable() {
        assert_eq!(
            selector().get_features("DOGEUSDT", "5m"),
            vec!["atr_ratio", "volume_ratio"]
        );
    }

    #[test]
    fn test_unknown_symbol_gets_universal_features() {
        let features = selector().get_features("ADAUSDT", "15m");
        assert_eq!(features.len(), 7);
        assert_eq!(features[0], "atr_ratio");
        assert_eq!(features[6], "returns_mean_50");
    }

    #[test]
    fn test_malformed_and_unprofitable_rows_skipped() {
        let selector = selector();
        // Empty feature list and negative profitability never load.
        assert_eq!(selector.get_features("PEPEUSDT", "5m").len(), 7);
        assert_eq!(selector.get_features("SHIBUSDT", "5m").len(), 7);
        assert_eq!(selector.catalog().len(), 4);
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        assert_eq!(
            selector().get_features("XRPUSDT", "30m"),
            vec!["sma7_sma25_ratio"]
        );
    }

    #[test]
    fn test_profitable_symbols() {
        assert_eq!(selector().profitable_symbols(), vec!["DOGEUSDT", "XRPUSDT"]);
    }

    #[test]
    fn test_missing_catalog_file_degrades_to_universal() {
        let selector = FeatureSelector::from_path(Some(Path::new("/nonexistent/catalog.csv")));
        assert!(selector.catalog().is_empty());
        assert_eq!(selector.get_features("DOGEUSDT", "15m").len(), 7);
    }
}
