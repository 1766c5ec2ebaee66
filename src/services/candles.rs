use crate::error::{AppError, Result};
use crate::services::price_history::PriceHistoryStore;
use crate::types::{Candle, PricePoint};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// OHLCV series supplied by the market-data layer.
pub trait CandleSource: Send + Sync {
    /// The most recent `limit` candles for a symbol and interval, oldest
    /// first. Empty if the series is unknown.
    fn candles(&self, symbol: &str, interval: &str, limit: usize) -> Vec<Candle>;
}

/// In-memory candle series keyed by `(symbol, interval)`.
#[derive(Default)]
pub struct CandleStore {
    series: DashMap<(String, String), Vec<Candle>>,
}

impl CandleStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace a series. Candles are sorted by open time and duplicate
    /// timestamps collapse to the last one given.
    pub fn insert(&self, symbol: &str, interval: &str, mut candles: Vec<Candle>) {
        candles.reverse();
        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);
        self.series
            .insert((symbol.to_string(), interval.to_string()), candles);
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl CandleSource for CandleStore {
    fn candles(&self, symbol: &str, interval: &str, limit: usize) -> Vec<Candle> {
        self.series
            .get(&(symbol.to_string(), interval.to_string()))
            .map(|series| {
                let start = series.len().saturating_sub(limit);
                series[start..].to_vec()
            })
            .unwrap_or_default()
    }
}

/// Recorded market state: price observations and candle series per symbol.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    /// Evaluation time (ms). Lookups are relative to the wall clock when
    /// absent.
    #[serde(default)]
    pub as_of: Option<i64>,
    /// Symbol -> price observations.
    #[serde(default)]
    pub prices: BTreeMap<String, Vec<PricePoint>>,
    /// Symbol -> interval -> candles.
    #[serde(default)]
    pub candles: BTreeMap<String, BTreeMap<String, Vec<Candle>>>,
}

impl MarketSnapshot {
    /// Read a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            warn!("Failed to read snapshot {}: {}", path.display(), e);
            AppError::Io(e)
        })?;
        let snapshot: Self = serde_json::from_str(&raw)?;
        info!(
            "Loaded snapshot with {} price series and {} candle symbols",
            snapshot.prices.len(),
            snapshot.candles.len()
        );
        Ok(snapshot)
    }

    /// Populate in-memory stores from the snapshot.
    pub fn into_stores(self) -> (Arc<PriceHistoryStore>, Arc<CandleStore>) {
        let prices = match self.as_of {
            Some(now) => PriceHistoryStore::anchored(now),
            None => PriceHistoryStore::new(),
        };
        for (symbol, points) in &self.prices {
            prices.seed(symbol, points);
        }

        let candles = CandleStore::new();
        for (symbol, by_interval) in self.candles {
            for (interval, series) in by_interval {
                candles.insert(&symbol, &interval, series);
            }
        }

        (prices, candles)
    }
}
