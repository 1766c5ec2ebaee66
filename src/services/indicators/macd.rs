//! MACD (Moving Average Convergence Divergence) features.

use super::rolling::{ewm, zip_with};
use super::{Feature, FeatureFrame, Series};
use crate::error::Result;

/// MACD line: EMA(12) - EMA(26) of close.
///
/// EMAs are recursive from the first close, not SMA-seeded, so the line is
/// defined from the first bar.
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
        }
    }
}

impl Feature for Macd {
    fn name(&self) -> &str {
        "macd"
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        let close = frame.require(self.name(), "close")?;
        let fast = ewm(close, self.fast_period);
        let slow = ewm(close, self.slow_period);
        Ok(zip_with(&fast, &slow, |f, s| f - s))
    }
}

/// Signal line: EMA(9) of the MACD line.
pub struct MacdSignal {
    signal_period: usize,
}

impl Default for MacdSignal {
    fn default() -> Self {
        Self { signal_period: 9 }
    }
}

impl Feature for MacdSignal {
    fn name(&self) -> &str {
        "macd_signal"
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["macd"]
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        Ok(ewm(frame.require(self.name(), "macd")?, self.signal_period))
    }
}

/// Histogram: MACD line minus signal line.
pub struct MacdHist;

impl Feature for MacdHist {
    fn name(&self) -> &str {
        "macd_hist"
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["macd", "macd_signal"]
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        Ok(zip_with(
            frame.require(self.name(), "macd")?,
            frame.require(self.name(), "macd_signal")?,
            |m, s| m - s,
        ))
    }
}
