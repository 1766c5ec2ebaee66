//! Bollinger Bands features.

use super::rolling::{rolling_mean, rolling_std};
use super::{Feature, FeatureFrame, Series};
use crate::error::Result;

/// Middle, upper and lower band per row.
struct Bands {
    middle: Series,
    upper: Series,
    lower: Series,
}

/// SMA(period) +/- multiplier * sample STD(period) of close.
fn bands(frame: &FeatureFrame, feature: &str, period: usize, multiplier: f64) -> Result<Bands> {
    let close = frame.require(feature, "close")?;
    let middle = rolling_mean(close, period);
    let std = rolling_std(close, period);

    let offset = |sign: f64| -> Series {
        middle
            .iter()
            .zip(std.iter())
            .map(|(m, s)| Some(m.as_ref()? + sign * multiplier * s.as_ref()?))
            .collect()
    };
    let upper = offset(1.0);
    let lower = offset(-1.0);

    Ok(Bands { middle, upper, lower })
}

/// Band width relative to the middle band: (upper - lower) / middle.
pub struct BollingerWidth {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerWidth {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl Feature for BollingerWidth {
    fn name(&self) -> &str {
        "bb_width"
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        let b = bands(frame, self.name(), self.period, self.std_dev_multiplier)?;
        Ok((0..frame.len())
            .map(|i| Some((b.upper[i]? - b.lower[i]?) / b.middle[i]?))
            .collect())
    }
}

/// %B: where close sits between the bands, 0 at the lower band and 1 at
/// the upper band.
pub struct BollingerPosition {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerPosition {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl Feature for BollingerPosition {
    fn name(&self) -> &str {
        "bb_position"
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        let b = bands(frame, self.name(), self.period, self.std_dev_multiplier)?;
        let close = frame.require(self.name(), "close")?;
        Ok((0..frame.len())
            .map(|i| Some((close[i]? - b.lower[i]?) / (b.upper[i]? - b.lower[i]?)))
            .collect())
    }
}
