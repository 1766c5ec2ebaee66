use super::GrowthRates;
use super::IndicatorMap;
use serde::{Deserialize, Serialize};

/// Discrete trading signal derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingSignal {
    StrongBuy,
    Buy,
    WeakBuy,
    Hold,
    WeakSell,
    StrongSell,
    /// At least one horizon showed exactly 0% growth.
    Dead,
}

impl TradingSignal {
    /// Signal and strength (0-5) for a composite score. Thresholds are
    /// inclusive lower bounds, evaluated highest first.
    pub fn from_composite(score: f64) -> (Self, u8) {
        match score {
            s if s >= 80.0 => (TradingSignal::StrongBuy, 5),
            s if s >= 70.0 => (TradingSignal::Buy, 4),
            s if s >= 60.0 => (TradingSignal::WeakBuy, 3),
            s if s >= 50.0 => (TradingSignal::Hold, 2),
            s if s >= 30.0 => (TradingSignal::WeakSell, 1),
            _ => (TradingSignal::StrongSell, 0),
        }
    }

    /// Explanation attached to the signal. `dead_count` only appears in
    /// the DEAD reason.
    pub fn reason(&self, dead_count: u32) -> String {
        match self {
            TradingSignal::StrongBuy => "Exceptional technical and growth metrics".to_string(),
            TradingSignal::Buy => "Strong positive indicators across metrics".to_string(),
            TradingSignal::WeakBuy => "Moderately positive signals".to_string(),
            TradingSignal::Hold => "Mixed signals - monitor closely".to_string(),
            TradingSignal::WeakSell => "Predominantly negative indicators".to_string(),
            TradingSignal::StrongSell => "Poor performance across all metrics".to_string(),
            TradingSignal::Dead => {
                format!("{} timeframe(s) with 0% growth - inactive coin", dead_count)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradingSignal::StrongBuy => "STRONG_BUY",
            TradingSignal::Buy => "BUY",
            TradingSignal::WeakBuy => "WEAK_BUY",
            TradingSignal::Hold => "HOLD",
            TradingSignal::WeakSell => "WEAK_SELL",
            TradingSignal::StrongSell => "STRONG_SELL",
            TradingSignal::Dead => "DEAD",
        }
    }
}

impl std::fmt::Display for TradingSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Composite score and signal for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    /// 0-100, gated by the activity multiplier.
    pub composite_score: f64,
    pub technical_score: f64,
    pub growth_score: f64,
    pub consistency_score: f64,
    /// Number of short horizons with exactly 0% growth.
    pub dead_count: u32,
    pub signal: TradingSignal,
    /// 0 (weakest) to 5 (strongest).
    pub signal_strength: u8,
    pub reasons: Vec<String>,
}

/// Growth/correlation summary for one symbol, before technical scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingEntry {
    pub symbol: String,
    pub price: f64,
    pub growth_rates: GrowthRates,
    /// Pearson correlation (x100) against the reference asset.
    pub reference_correlation: Option<f64>,
    /// Steadiness across the hourly horizons.
    pub consistency_score: Option<f64>,
    /// Horizon-weighted mean growth.
    pub overall_performance: Option<f64>,
    /// Plain mean of the defined growth rates.
    pub avg_growth: f64,
}

/// Fully scored symbol as produced by a ranking pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSymbol {
    #[serde(flatten)]
    pub trend: TrendingEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<IndicatorMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreRecord>,
}

impl RankedSymbol {
    /// Composite score used for ordering; unscored symbols rank as 0.
    pub fn composite_score(&self) -> f64 {
        self.score.as_ref().map(|s| s.composite_score).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_composite_bounds() {
        assert_eq!(TradingSignal::from_composite(80.0), (TradingSignal::StrongBuy, 5));
        assert_eq!(TradingSignal::from_composite(79.99), (TradingSignal::Buy, 4));
        assert_eq!(TradingSignal::from_composite(50.0), (TradingSignal::Hold, 2));
        assert_eq!(TradingSignal::from_composite(29.99), (TradingSignal::StrongSell, 0));
    }

    #[test]
    fn test_reason_carries_dead_count() {
        assert_eq!(
            TradingSignal::Dead.reason(2),
            "2 timeframe(s) with 0% growth - inactive coin"
        );
        assert_eq!(TradingSignal::Hold.reason(0), "Mixed signals - monitor closely");
    }
}
