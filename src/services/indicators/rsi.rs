//! Relative Strength Index (RSI) feature.

use super::rolling::rolling_mean;
use super::{Feature, FeatureFrame, Series};
use crate::error::Result;

/// RSI from simple rolling means of gains and losses:
/// `100 - 100 / (1 + mean_gain / mean_loss)`.
///
/// Values range from 0-100. A window with no losses reads 100; a window
/// with no movement at all is undefined.
pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    /// Period 14 is published as `rsi`, any other as `rsi_<period>`.
    pub fn new(period: usize) -> Self {
        let name = if period == 14 {
            "rsi".to_string()
        } else {
            format!("rsi_{}", period)
        };
        Self { name, period }
    }

    fn gains_and_losses(close: &Series) -> (Series, Series) {
        let mut gains = Vec::with_capacity(close.len());
        let mut losses = Vec::with_capacity(close.len());

        for i in 0..close.len() {
            // The first bar has no change and counts as neither.
            let delta = match (i.checked_sub(1).and_then(|p| close[p]), close[i]) {
                (Some(prev), Some(cur)) => cur - prev,
                _ => 0.0,
            };
            gains.push(Some(delta.max(0.0)));
            losses.push(Some((-delta).max(0.0)));
        }

        (gains, losses)
    }
}

impl Feature for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, frame: &FeatureFrame) -> Result<Series> {
        let close = frame.require(&self.name, "close")?;
        let (gains, losses) = Self::gains_and_losses(close);
        let avg_gain = rolling_mean(&gains, self.period);
        let avg_loss = rolling_mean(&losses, self.period);

        Ok(avg_gain
            .iter()
            .zip(avg_loss.iter())
            .map(|(g, l)| match (g, l) {
                (Some(g), Some(l)) if *l > 0.0 => Some(100.0 - 100.0 / (1.0 + g / l)),
                (Some(g), Some(_)) if *g > 0.0 => Some(100.0),
                _ => None,
            })
            .collect())
    }
}
