use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest indicator values for a symbol/timeframe, plus the candle metadata
/// they were read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorMap {
    pub symbol: String,
    pub timeframe: String,
    /// Open time (ms) of the candle the values were read from.
    pub timestamp: i64,
    /// Close price of that candle.
    pub price: f64,
    /// Feature name -> value. Features without enough history are absent.
    pub values: BTreeMap<String, f64>,
}

impl IndicatorMap {
    pub fn new(symbol: &str, timeframe: &str, timestamp: i64, price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            timestamp,
            price,
            values: BTreeMap::new(),
        }
    }

    /// Value of a feature, if it was computed with enough history.
    pub fn get(&self, feature: &str) -> Option<f64> {
        self.values.get(feature).copied()
    }

    /// Insert a value. Non-finite values are never stored.
    pub fn insert(&mut self, feature: &str, value: f64) {
        if value.is_finite() {
            self.values.insert(feature.to_string(), value);
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, feature: &str, value: f64) -> Self {
        self.insert(feature, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
