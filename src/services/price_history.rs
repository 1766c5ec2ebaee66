use crate::types::PricePoint;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Tolerance around the target time for a point lookup.
pub const LOOKUP_WINDOW_MS: i64 = 2 * 60 * 1000;

const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Point-in-time price lookups supplied by the persistence layer.
pub trait PriceHistory: Send + Sync {
    /// Price recorded closest to `minutes_ago` before now, within
    /// [`LOOKUP_WINDOW_MS`] either side.
    fn price_at(&self, symbol: &str, minutes_ago: i64) -> Option<f64>;

    /// Observations from the last `hours`, oldest first.
    fn history(&self, symbol: &str, hours: f64) -> Vec<PricePoint>;

    /// Most recent price of every tracked symbol.
    fn latest_prices(&self) -> BTreeMap<String, f64>;
}

/// In-memory price history keyed by symbol.
///
/// "Now" is the wall clock unless the store is anchored to a fixed time,
/// which makes lookups over a recorded snapshot deterministic.
pub struct PriceHistoryStore {
    data: DashMap<String, Vec<PricePoint>>,
    now: Option<i64>,
}

impl PriceHistoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store whose lookups are relative to `now_ms`.
    pub fn anchored(now_ms: i64) -> Arc<Self> {
        Arc::new(Self {
            data: DashMap::new(),
            now: Some(now_ms),
        })
    }

    fn now_ms(&self) -> i64 {
        self.now
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
    }

    /// Record a price. Points stay time ordered; a repeated timestamp
    /// replaces the earlier observation.
    pub fn record(&self, symbol: &str, price: f64, timestamp: i64) {
        let mut series = self.data.entry(symbol.to_string()).or_default();
        match series.binary_search_by_key(&timestamp, |p| p.timestamp) {
            Ok(idx) => series[idx].price = price,
            Err(idx) => series.insert(idx, PricePoint::new(timestamp, price)),
        }
    }

    /// Record one observation per symbol at the same timestamp.
    pub fn record_prices(&self, prices: &BTreeMap<String, f64>, timestamp: i64) {
        for (symbol, price) in prices {
            self.record(symbol, *price, timestamp);
        }
        debug!("Recorded prices for {} symbols", prices.len());
    }

    /// Seed a symbol from a batch of points in any order.
    pub fn seed(&self, symbol: &str, points: &[PricePoint]) {
        for point in points {
            self.record(symbol, point.price, point.timestamp);
        }
    }

    pub fn symbol_count(&self) -> usize {
        self.data.len()
    }
}

impl Default for PriceHistoryStore {
    fn default() -> Self {
        Self {
            data: DashMap::new(),
            now: None,
        }
    }
}

impl PriceHistory for PriceHistoryStore {
    fn price_at(&self, symbol: &str, minutes_ago: i64) -> Option<f64> {
        let target = self.now_ms() - minutes_ago * MS_PER_MINUTE;
        let series = self.data.get(symbol)?;

        series
            .iter()
            .filter(|p| (p.timestamp - target).abs() <= LOOKUP_WINDOW_MS)
            .min_by_key(|p| (p.timestamp - target).abs())
            .map(|p| p.price)
    }

    fn history(&self, symbol: &str, hours: f64) -> Vec<PricePoint> {
        let now = self.now_ms();
        let cutoff = now - (hours * MS_PER_HOUR) as i64;

        self.data
            .get(symbol)
            .map(|series| {
                series
                    .iter()
                    .filter(|p| p.timestamp >= cutoff && p.timestamp <= now)
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn latest_prices(&self) -> BTreeMap<String, f64> {
        self.data
            .iter()
            .filter_map(|entry| {
                entry
                    .value()
                    .last()
                    .map(|p| (entry.key().clone(), p.price))
            })
            .collect()
    }
}
