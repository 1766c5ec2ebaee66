//! Volume and trading-activity features.

use super::rolling::{divide, rolling, rolling_mean, RollingStat};
use super::{Feature, FeatureFrame, Series};
use crate::error::Result;

/// Rolling mean or standard deviation of raw volume
/// (`volume_mean_N` / `volume_std_N`).
pub struct VolumeStat {
    name: String,
    window: usize,
    stat: RollingStat,
}

impl VolumeStat {
    pub fn new(window: usize, stat: RollingStat) -> Self {
        Self {
            name: format!("volume_{}_{}", stat.label(), window),
            window,
            stat,
        }
    }
}

impl Feature for VolumeStat {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        Ok(self.stat.apply(frame.require(&self.name, "volume")?, self.window))
    }
}

/// Trade count relative to its rolling mean.
pub struct TradeIntensity {
    window: usize,
}

impl Default for TradeIntensity {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl Feature for TradeIntensity {
    fn name(&self) -> &str {
        "trade_intensity"
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        let trades = frame.require(self.name(), "trades")?;
        Ok(divide(trades, &rolling_mean(trades, self.window)))
    }
}

/// Share (0-100) of the window's volumes strictly below the current volume.
pub struct VolPercentile {
    window: usize,
}

impl Default for VolPercentile {
    fn default() -> Self {
        Self { window: 50 }
    }
}

impl Feature for VolPercentile {
    fn name(&self) -> &str {
        "vol_percentile"
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        let volume = frame.require(self.name(), "volume")?;
        Ok(rolling(volume, self.window, |window| {
            let current = window[window.len() - 1];
            let below = window.iter().filter(|v| **v < current).count();
            below as f64 / window.len() as f64 * 100.0
        }))
    }
}
