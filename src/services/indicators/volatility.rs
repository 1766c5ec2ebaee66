//! Volatility features: ATR ratio and rolling return statistics.

use super::rolling::{divide, rolling_mean, RollingStat};
use super::{Feature, FeatureFrame, Series};
use crate::error::Result;

/// ATR relative to price.
///
/// TR = max(High-Low, |High-PrevClose|, |Low-PrevClose|), the first bar
/// using High-Low alone. ATR is the simple rolling mean of TR.
pub struct AtrRatio {
    period: usize,
}

impl Default for AtrRatio {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl AtrRatio {
    fn true_ranges(frame: &FeatureFrame, name: &str) -> Result<Series> {
        let high = frame.require(name, "high")?;
        let low = frame.require(name, "low")?;
        let close = frame.require(name, "close")?;

        Ok((0..frame.len())
            .map(|i| {
                let (h, l) = (high[i]?, low[i]?);
                let hl = h - l;
                match i.checked_sub(1).and_then(|p| close[p]) {
                    Some(pc) => Some(hl.max((h - pc).abs()).max((l - pc).abs())),
                    None => Some(hl),
                }
            })
            .collect())
    }
}

impl Feature for AtrRatio {
    fn name(&self) -> &str {
        "atr_ratio"
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        let atr = rolling_mean(&Self::true_ranges(frame, self.name())?, self.period);
        Ok(divide(&atr, frame.require(self.name(), "close")?))
    }
}

/// Rolling mean or standard deviation of `returns`
/// (`returns_mean_N` / `returns_std_N`).
pub struct ReturnsStat {
    name: String,
    window: usize,
    stat: RollingStat,
}

impl ReturnsStat {
    pub fn new(window: usize, stat: RollingStat) -> Self {
        Self {
            name: format!("returns_{}_{}", stat.label(), window),
            window,
            stat,
        }
    }
}

impl Feature for ReturnsStat {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["returns"]
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        Ok(self.stat.apply(frame.require(&self.name, "returns")?, self.window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::indicators::fixtures::create_uptrend_candles;
    use crate::types::Candle;

    fn flat_candles(count: usize) -> Vec<Candle> {
        (0..count)
            .map(|i| Candle {
                timestamp: i as i64 * 60_000,
                open: 10.0,
                high: 10.5,
                low: 9.5,
                close: 10.0,
                volume: 100.0,
                trade_count: 5,
            })
            .collect()
    }

    #[test]
    fn test_atr_ratio_flat_range() {
        let frame = FeatureFrame::from_candles(&flat_candles(20));
        let atr = AtrRatio::default().compute(&frame).unwrap();
        assert_eq!(atr[12], None);
        assert!((atr[13].unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_true_range_uses_previous_close_gap() {
        let mut candles = flat_candles(2);
        candles[1].high = 12.0;
        candles[1].low = 11.5;
        let frame = FeatureFrame::from_candles(&candles);
        let tr = AtrRatio::true_ranges(&frame, "atr_ratio").unwrap();
        assert_eq!(tr[0], Some(1.0));
        // |high - prev close| dominates the 0.5 bar range.
        assert_eq!(tr[1], Some(2.0));
    }

    #[test]
    fn test_returns_stat_names_and_dependency() {
        let stat = ReturnsStat::new(50, RollingStat::Std);
        assert_eq!(stat.name(), "returns_std_50");
        assert_eq!(stat.dependencies(), vec!["returns"]);
        assert_eq!(ReturnsStat::new(10, RollingStat::Mean).name(), "returns_mean_10");
    }

    #[test]
    fn test_returns_mean_on_constant_growth() {
        let mut frame = FeatureFrame::from_candles(&create_uptrend_candles(60));
        let returns = super::super::Returns.compute(&frame).unwrap();
        frame.insert("returns", returns);
        let mean = ReturnsStat::new(20, RollingStat::Mean).compute(&frame).unwrap();
        assert_eq!(mean[19], None);
        assert!((mean[59].unwrap() - 0.01).abs() < 1e-9);
    }
}
