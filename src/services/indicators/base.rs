//! Base metrics derived directly from candle columns.

use super::rolling::{divide, pct_change, rolling_mean};
use super::{Feature, FeatureFrame, Series};
use crate::error::Result;

/// Close-to-close fractional change.
pub struct Returns;

impl Feature for Returns {
    fn name(&self) -> &str {
        "returns"
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        Ok(pct_change(frame.require(self.name(), "close")?))
    }
}

/// High / low of each candle.
pub struct HighLowRatio;

impl Feature for HighLowRatio {
    fn name(&self) -> &str {
        "high_low_ratio"
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        Ok(divide(
            frame.require(self.name(), "high")?,
            frame.require(self.name(), "low")?,
        ))
    }
}

/// Close / open of each candle.
pub struct CloseOpenRatio;

impl Feature for CloseOpenRatio {
    fn name(&self) -> &str {
        "close_open_ratio"
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        Ok(divide(
            frame.require(self.name(), "close")?,
            frame.require(self.name(), "open")?,
        ))
    }
}

/// Volume relative to its 20-period mean.
pub struct VolumeRatio;

impl Feature for VolumeRatio {
    fn name(&self) -> &str {
        "volume_ratio"
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        let volume = frame.require(self.name(), "volume")?;
        Ok(divide(volume, &rolling_mean(volume, 20)))
    }
}
