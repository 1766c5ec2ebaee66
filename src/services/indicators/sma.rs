//! Simple moving average ratio features.

use super::rolling::{divide, rolling_mean};
use super::{Feature, FeatureFrame, Series};
use crate::error::Result;

/// Close relative to its SMA (`price_sma<period>_ratio`).
/// Above 1.0 means price trades above its average.
pub struct PriceSmaRatio {
    name: String,
    period: usize,
}

impl PriceSmaRatio {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("price_sma{}_ratio", period),
            period,
        }
    }
}

impl Feature for PriceSmaRatio {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        let close = frame.require(&self.name, "close")?;
        Ok(divide(close, &rolling_mean(close, self.period)))
    }
}

/// Fast SMA over slow SMA of close.
pub struct SmaCrossRatio {
    fast_period: usize,
    slow_period: usize,
}

impl Default for SmaCrossRatio {
    fn default() -> Self {
        Self {
            fast_period: 7,
            slow_period: 25,
        }
    }
}

impl Feature for SmaCrossRatio {
    fn name(&self) -> &str {
        "sma7_sma25_ratio"
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        let close = frame.require(self.name(), "close")?;
        Ok(divide(
            &rolling_mean(close, self.fast_period),
            &rolling_mean(close, self.slow_period),
        ))
    }
}
