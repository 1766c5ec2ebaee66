//! Composite buy/hold/sell scoring.
//!
//! Blends three sub-scores into one 0-100 figure:
//! - technical strength from the weighted indicator table
//! - growth across the short horizons, with dead-coin penalties
//! - consistency of that growth
//!
//! The blend is gated by an activity multiplier and mapped to a
//! [`TradingSignal`].

pub mod weights;

pub use weights::{Thresholds, FEATURE_THRESHOLDS, FEATURE_WEIGHTS};

use crate::services::indicators::rolling::{mean, population_std};
use crate::types::{GrowthRates, Horizon, IndicatorMap, ScoreRecord, TradingSignal};
use std::collections::HashMap;
use tracing::debug;

/// Growth-score parameters for one short horizon.
#[derive(Debug, Clone, Copy)]
pub struct GrowthTier {
    pub horizon: Horizon,
    /// Growth (%) at or above which the full weight is earned.
    pub min_threshold: f64,
    /// Added for exactly 0% growth; half of it for negative growth.
    pub zero_penalty: f64,
    pub weight: f64,
}

pub const GROWTH_TIERS: [GrowthTier; 4] = [
    GrowthTier { horizon: Horizon::FiveMinutes, min_threshold: 3.0, zero_penalty: -20.0, weight: 20.0 },
    GrowthTier { horizon: Horizon::FifteenMinutes, min_threshold: 5.0, zero_penalty: -25.0, weight: 25.0 },
    GrowthTier { horizon: Horizon::ThirtyMinutes, min_threshold: 7.0, zero_penalty: -30.0, weight: 30.0 },
    GrowthTier { horizon: Horizon::OneHour, min_threshold: 10.0, zero_penalty: -35.0, weight: 25.0 },
];

/// Growth score ceiling once any horizon is dead.
const DEAD_GROWTH_CAP: f64 = 20.0;

const TECHNICAL_WEIGHT: f64 = 0.4;
const GROWTH_WEIGHT: f64 = 0.3;
const CONSISTENCY_WEIGHT: f64 = 0.3;

/// Round to 2 decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Composite multiplier for the number of dead horizons.
pub fn activity_multiplier(dead_count: u32) -> f64 {
    match dead_count {
        0 => 1.0,
        1 => 0.5,
        _ => 0.1,
    }
}

/// Scores indicator maps and growth-rate maps. Holds only the read-only
/// weight and threshold tables, so one engine can be shared across threads.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: Vec<(String, f64)>,
    thresholds: HashMap<String, Thresholds>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::with_tables(
            FEATURE_WEIGHTS.iter().map(|(n, w)| (n.to_string(), *w)),
            FEATURE_THRESHOLDS.iter().map(|(n, t)| (n.to_string(), *t)),
        )
    }
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with custom tables.
    pub fn with_tables(
        weights: impl IntoIterator<Item = (String, f64)>,
        thresholds: impl IntoIterator<Item = (String, Thresholds)>,
    ) -> Self {
        Self {
            weights: weights.into_iter().collect(),
            thresholds: thresholds.into_iter().collect(),
        }
    }

    /// Weighted mean of per-feature sub-scores, scaled to 0-100. Only
    /// features in both the weight table and the map count; 0 if none do.
    pub fn calculate_technical_strength(&self, indicators: &IndicatorMap) -> f64 {
        let mut total_score = 0.0;
        let mut total_weight = 0.0;

        for (feature, weight) in &self.weights {
            if let Some(value) = indicators.get(feature) {
                total_score += self.score_indicator(feature, value) * weight;
                total_weight += weight;
            }
        }

        if total_weight > 0.0 {
            (total_score / total_weight * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// Sub-score in [0, 1] for one feature value.
    pub fn score_indicator(&self, feature: &str, value: f64) -> f64 {
        let Some(t) = self.thresholds.get(feature) else {
            return Self::generic_score(feature, value);
        };

        if let Some(overbought) = t.overbought {
            return match value {
                v if v >= overbought => 0.3,
                v if v >= t.bullish => 0.8,
                v if v >= t.bearish => 0.5,
                _ => 0.2,
            };
        }

        if value >= t.bullish {
            1.0
        } else if value >= t.bearish {
            let range = t.bullish - t.bearish;
            // Equal thresholds never get here: the `>= bullish` arm wins.
            if range > 0.0 {
                (value - t.bearish) / range
            } else {
                0.5
            }
        } else {
            0.2
        }
    }

    /// Fallback scoring by feature family, matched on the name.
    pub fn generic_score(feature: &str, value: f64) -> f64 {
        if feature.contains("volume") && !feature.contains("std") {
            match value {
                v if v > 1.5 => 1.0,
                v if v > 1.0 => 0.7,
                v if v > 0.5 => 0.5,
                _ => 0.2,
            }
        } else if feature.contains("std") || feature.contains("atr") {
            // Moderate volatility scores best.
            if value > 0.01 && value < 0.05 {
                1.0
            } else if value > 0.005 && value < 0.1 {
                0.7
            } else {
                0.3
            }
        } else if feature.contains("ratio") {
            if value > 0.95 && value < 1.05 {
                0.5
            } else if value >= 1.05 {
                ((value - 1.0) * 2.0).min(1.0)
            } else {
                value.max(0.2)
            }
        } else {
            0.5
        }
    }

    /// Growth score (0-100) and number of dead horizons.
    pub fn calculate_growth_score(&self, growth_rates: &GrowthRates) -> (f64, u32) {
        let mut score = 0.0;
        let mut dead_count = 0;

        for tier in &GROWTH_TIERS {
            let Some(rate) = growth_rates.get(tier.horizon) else {
                continue;
            };

            if rate == 0.0 {
                score += tier.zero_penalty;
                dead_count += 1;
            } else if rate < 0.0 {
                score += tier.zero_penalty * 0.5;
            } else if rate < tier.min_threshold {
                score += rate / tier.min_threshold * tier.weight;
            } else {
                score += tier.weight;
            }
        }

        if dead_count > 0 {
            score = score.min(DEAD_GROWTH_CAP);
        }

        (score.max(0.0), dead_count)
    }

    /// Steadiness of growth across the short horizons (0-100).
    ///
    /// Needs at least three defined rates, all positive. Starts at 100 and
    /// loses points for each adjacent pair that fails to increase or jumps
    /// by more than 5 points; earns 10 back when the spread is tight.
    pub fn calculate_consistency_score(&self, growth_rates: &GrowthRates) -> f64 {
        let rates = growth_rates.defined(&Horizon::SHORT);

        if rates.len() < 3 || rates.iter().any(|r| *r <= 0.0) {
            return 0.0;
        }

        let mut score: f64 = 100.0;
        for pair in rates.windows(2) {
            if pair[1] <= pair[0] {
                score -= 20.0;
            }
            let diff = (pair[1] - pair[0]).abs();
            if diff > 10.0 {
                score -= 15.0;
            } else if diff > 5.0 {
                score -= 10.0;
            }
        }

        if population_std(&rates) < mean(&rates) * 0.3 {
            score += 10.0;
        }

        score.clamp(0.0, 100.0)
    }

    /// Full score record for one symbol.
    pub fn calculate_composite_score(
        &self,
        growth_rates: &GrowthRates,
        indicators: &IndicatorMap,
    ) -> ScoreRecord {
        let technical_score = self.calculate_technical_strength(indicators);
        let (growth_score, dead_count) = self.calculate_growth_score(growth_rates);
        let consistency_score = self.calculate_consistency_score(growth_rates);

        let blended = technical_score * TECHNICAL_WEIGHT
            + growth_score * GROWTH_WEIGHT
            + consistency_score * CONSISTENCY_WEIGHT;
        let composite_score = round2((blended * activity_multiplier(dead_count)).clamp(0.0, 100.0));

        let (signal, signal_strength, reasons) =
            self.generate_signal(composite_score, dead_count, growth_rates);

        debug!(
            "{} scored {:.2} ({}): technical {:.2}, growth {:.2}, consistency {:.2}",
            indicators.symbol, composite_score, signal, technical_score, growth_score, consistency_score
        );

        ScoreRecord {
            composite_score,
            technical_score: round2(technical_score),
            growth_score: round2(growth_score),
            consistency_score: round2(consistency_score),
            dead_count,
            signal,
            signal_strength,
            reasons,
        }
    }

    /// Signal, strength and reasons. Any dead horizon overrides the score.
    pub fn generate_signal(
        &self,
        composite_score: f64,
        dead_count: u32,
        growth_rates: &GrowthRates,
    ) -> (TradingSignal, u8, Vec<String>) {
        if dead_count > 0 {
            let signal = TradingSignal::Dead;
            return (signal, 0, vec![signal.reason(dead_count)]);
        }

        let mut reasons = Vec::new();
        let negative_count = growth_rates.iter().filter(|(_, r)| *r < 0.0).count();
        if negative_count > 1 {
            reasons.push(format!("{} timeframes showing negative growth", negative_count));
        }

        let (signal, strength) = TradingSignal::from_composite(composite_score);
        reasons.push(signal.reason(dead_count));

        (signal, strength, reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(values: &[(Horizon, f64)]) -> GrowthRates {
        values.iter().copied().collect()
    }

    fn map(values: &[(&str, f64)]) -> IndicatorMap {
        values
            .iter()
            .fold(IndicatorMap::new("TESTUSDT", "15m", 0, 1.0), |m, (k, v)| m.with(k, *v))
    }

    fn short(r5: f64, r15: f64, r30: f64, r1h: f64) -> GrowthRates {
        rates(&[
            (Horizon::FiveMinutes, r5),
            (Horizon::FifteenMinutes, r15),
            (Horizon::ThirtyMinutes, r30),
            (Horizon::OneHour, r1h),
        ])
    }

    #[test]
    fn test_technical_strength_no_overlap_is_zero() {
        let engine = ScoringEngine::new();
        assert_eq!(engine.calculate_technical_strength(&map(&[])), 0.0);
        assert_eq!(engine.calculate_technical_strength(&map(&[("ichimoku", 3.0)])), 0.0);
    }

    #[test]
    fn test_technical_strength_bounds() {
        let engine = ScoringEngine::new();
        let best = map(&[("atr_ratio", 0.05), ("bb_position", 0.9), ("volume_mean_10", 2.0)]);
        assert!((engine.calculate_technical_strength(&best) - 100.0).abs() < 1e-9);

        let worst = map(&[("atr_ratio", 0.0), ("macd_signal", -4.0)]);
        let score = engine.calculate_technical_strength(&worst);
        assert!((score - 20.0).abs() < 1e-9);

        let extreme = map(&[
            ("price_sma7_ratio", 1e9),
            ("close_open_ratio", -1e9),
            ("returns_std_10", f64::MAX),
            ("volume_mean_20", f64::MIN),
        ]);
        let score = engine.calculate_technical_strength(&extreme);
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn test_technical_strength_weighted_mean() {
        let engine = ScoringEngine::new();
        // atr_ratio 1.0 * 0.75, rsi_7 (generic) 0.5 * 0.10
        let indicators = map(&[("atr_ratio", 0.03), ("rsi_7", 55.0)]);
        let expected = (0.75 + 0.05) / 0.85 * 100.0;
        assert!((engine.calculate_technical_strength(&indicators) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_score_indicator_rsi_bands() {
        let engine = ScoringEngine::new();
        assert_eq!(engine.score_indicator("rsi", 75.0), 0.3);
        assert_eq!(engine.score_indicator("rsi", 70.0), 0.3);
        assert_eq!(engine.score_indicator("rsi", 55.0), 0.8);
        assert_eq!(engine.score_indicator("rsi", 30.0), 0.5);
        assert_eq!(engine.score_indicator("rsi", 12.0), 0.2);
    }

    #[test]
    fn test_score_indicator_interpolates() {
        let engine = ScoringEngine::new();
        assert_eq!(engine.score_indicator("bb_position", 0.5), 1.0);
        assert!((engine.score_indicator("bb_position", 0.35) - 0.5).abs() < 1e-12);
        assert_eq!(engine.score_indicator("bb_position", 0.1), 0.2);
        assert!((engine.score_indicator("macd_signal", -0.25) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_width_thresholds_are_step() {
        let engine = ScoringEngine::with_tables(
            vec![("flat".to_string(), 1.0)],
            vec![("flat".to_string(), Thresholds::new(1.0, 1.0))],
        );
        assert_eq!(engine.score_indicator("flat", 1.0), 1.0);
        assert_eq!(engine.score_indicator("flat", 0.9), 0.2);
    }

    #[test]
    fn test_generic_score_families() {
        assert_eq!(ScoringEngine::generic_score("volume_mean_20", 1.6), 1.0);
        assert_eq!(ScoringEngine::generic_score("volume_mean_20", 1.2), 0.7);
        assert_eq!(ScoringEngine::generic_score("volume_mean_20", 0.7), 0.5);
        assert_eq!(ScoringEngine::generic_score("volume_mean_20", 0.1), 0.2);

        assert_eq!(ScoringEngine::generic_score("returns_std_10", 0.02), 1.0);
        assert_eq!(ScoringEngine::generic_score("volume_std_10", 0.08), 0.7);
        assert_eq!(ScoringEngine::generic_score("returns_std_20", 0.5), 0.3);

        assert_eq!(ScoringEngine::generic_score("price_sma7_ratio", 1.0), 0.5);
        assert!((ScoringEngine::generic_score("price_sma7_ratio", 1.05) - 0.1).abs() < 1e-9);
        assert_eq!(ScoringEngine::generic_score("price_sma7_ratio", 1.8), 1.0);
        assert_eq!(ScoringEngine::generic_score("price_sma7_ratio", 0.9), 0.9);
        assert_eq!(ScoringEngine::generic_score("close_open_ratio", 0.1), 0.2);

        assert_eq!(ScoringEngine::generic_score("macd", 3.0), 0.5);
    }

    #[test]
    fn test_growth_score_at_minimums_is_full() {
        let engine = ScoringEngine::new();
        let (score, dead) = engine.calculate_growth_score(&short(3.0, 5.0, 7.0, 10.0));
        assert_eq!(score, 100.0);
        assert_eq!(dead, 0);
    }

    #[test]
    fn test_growth_score_partial_and_negative() {
        let engine = ScoringEngine::new();
        // 1.5/3*20 + 25 + (-15) + 25
        let (score, dead) = engine.calculate_growth_score(&short(1.5, 6.0, -2.0, 12.0));
        assert!((score - 45.0).abs() < 1e-9);
        assert_eq!(dead, 0);
    }

    #[test]
    fn test_growth_score_dead_is_capped() {
        let engine = ScoringEngine::new();
        for dead_horizon in Horizon::SHORT {
            let mut growth = short(50.0, 50.0, 50.0, 50.0);
            growth.set(dead_horizon, Some(0.0));
            let (score, dead) = engine.calculate_growth_score(&growth);
            assert!(dead >= 1);
            assert!(score <= 20.0);
        }
    }

    #[test]
    fn test_growth_score_floor_and_missing() {
        let engine = ScoringEngine::new();
        let (score, dead) = engine.calculate_growth_score(&short(0.0, 0.0, -1.0, -1.0));
        assert_eq!(score, 0.0);
        assert_eq!(dead, 2);

        let (score, dead) = engine.calculate_growth_score(&GrowthRates::new());
        assert_eq!(score, 0.0);
        assert_eq!(dead, 0);

        // Longer horizons never contribute.
        let hourly = rates(&[(Horizon::TwoHours, 0.0), (Horizon::TwelveHours, 40.0)]);
        assert_eq!(engine.calculate_growth_score(&hourly), (0.0, 0));
    }

    #[test]
    fn test_consistency_steady_growth() {
        let engine = ScoringEngine::new();
        let growth = rates(&[
            (Horizon::FiveMinutes, 4.0),
            (Horizon::FifteenMinutes, 5.0),
            (Horizon::ThirtyMinutes, 6.0),
        ]);
        assert!(engine.calculate_consistency_score(&growth) > 80.0);
    }

    #[test]
    fn test_consistency_non_increasing_penalized() {
        let engine = ScoringEngine::new();
        let growth = rates(&[
            (Horizon::FiveMinutes, 4.0),
            (Horizon::FifteenMinutes, 3.0),
            (Horizon::ThirtyMinutes, 6.0),
        ]);
        // 100 - 20, then +10 for the tight spread.
        assert_eq!(engine.calculate_consistency_score(&growth), 90.0);

        // Without the bonus the full 20-point penalty shows.
        let wide = rates(&[
            (Horizon::FiveMinutes, 4.0),
            (Horizon::FifteenMinutes, 2.0),
            (Horizon::ThirtyMinutes, 6.0),
        ]);
        assert_eq!(engine.calculate_consistency_score(&wide), 80.0);
    }

    #[test]
    fn test_consistency_jump_penalties() {
        let engine = ScoringEngine::new();
        // +6 (-10), +12 (-15); std well above 0.3 * mean.
        let growth = short(1.0, 7.0, 19.0, 20.0);
        assert_eq!(engine.calculate_consistency_score(&growth), 75.0);
    }

    #[test]
    fn test_consistency_requires_three_positive_rates() {
        let engine = ScoringEngine::new();
        let two = rates(&[(Horizon::FiveMinutes, 4.0), (Horizon::OneHour, 9.0)]);
        assert_eq!(engine.calculate_consistency_score(&two), 0.0);
        assert_eq!(engine.calculate_consistency_score(&short(4.0, 5.0, 0.0, 6.0)), 0.0);
        assert_eq!(engine.calculate_consistency_score(&short(4.0, -5.0, 6.0, 7.0)), 0.0);
    }

    #[test]
    fn test_composite_dead_always_dead() {
        let engine = ScoringEngine::new();
        let indicators = map(&[("atr_ratio", 0.03), ("rsi", 60.0)]);
        for growth in [short(0.0, 50.0, 50.0, 50.0), short(0.0, 0.0, 0.0, 0.0)] {
            let record = engine.calculate_composite_score(&growth, &indicators);
            assert_eq!(record.signal, TradingSignal::Dead);
            assert_eq!(record.signal_strength, 0);
            assert_eq!(record.reasons.len(), 1);
            assert!(record.reasons[0].contains("0% growth"));
        }
    }

    #[test]
    fn test_composite_activity_multiplier() {
        let engine = ScoringEngine::new();
        let indicators = map(&[("atr_ratio", 0.03)]);
        // technical 100, growth min(25+30+25, 20) = 20, consistency 0
        let record = engine.calculate_composite_score(&short(0.0, 10.0, 10.0, 10.0), &indicators);
        assert_eq!(record.dead_count, 1);
        assert_eq!(record.technical_score, 100.0);
        assert_eq!(record.growth_score, 20.0);
        assert_eq!(record.consistency_score, 0.0);
        assert_eq!(record.composite_score, 23.0);
    }

    #[test]
    fn test_composite_strong_buy() {
        let engine = ScoringEngine::new();
        let indicators = map(&[("atr_ratio", 0.03), ("volume_mean_50", 1.5)]);
        let record = engine.calculate_composite_score(&short(4.0, 6.0, 8.0, 11.0), &indicators);
        assert_eq!(record.composite_score, 100.0);
        assert_eq!(record.signal, TradingSignal::StrongBuy);
        assert_eq!(record.signal_strength, 5);
        assert_eq!(record.reasons, vec!["Exceptional technical and growth metrics"]);
    }

    #[test]
    fn test_signal_boundaries() {
        let engine = ScoringEngine::new();
        let growth = GrowthRates::new();
        let cases = [
            (80.0, TradingSignal::StrongBuy, 5),
            (79.99, TradingSignal::Buy, 4),
            (70.0, TradingSignal::Buy, 4),
            (60.0, TradingSignal::WeakBuy, 3),
            (50.0, TradingSignal::Hold, 2),
            (49.99, TradingSignal::WeakSell, 1),
            (30.0, TradingSignal::WeakSell, 1),
            (29.99, TradingSignal::StrongSell, 0),
        ];
        for (score, signal, strength) in cases {
            let (s, st, _) = engine.generate_signal(score, 0, &growth);
            assert_eq!((s, st), (signal, strength), "score {}", score);
        }
    }

    #[test]
    fn test_negative_growth_reason() {
        let engine = ScoringEngine::new();
        let growth = rates(&[
            (Horizon::FiveMinutes, -1.0),
            (Horizon::TwoHours, -3.0),
            (Horizon::TwelveHours, 5.0),
        ]);
        let (signal, _, reasons) = engine.generate_signal(55.0, 0, &growth);
        assert_eq!(signal, TradingSignal::Hold);
        assert_eq!(
            reasons,
            vec!["2 timeframes showing negative growth", "Mixed signals - monitor closely"]
        );

        let one_negative = rates(&[(Horizon::FiveMinutes, -1.0)]);
        let (_, _, reasons) = engine.generate_signal(55.0, 0, &one_negative);
        assert_eq!(reasons.len(), 1);
    }
}
