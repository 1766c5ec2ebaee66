//! Growth-rate, correlation and overall-performance calculators.
//!
//! These feed the scoring engine and the trending list. Missing history is
//! never an error here: every calculator returns `None` instead.

use crate::config::TrendConfig;
use crate::services::indicators::rolling::{mean, population_std};
use crate::services::price_history::PriceHistory;
use crate::types::{GrowthRates, Horizon, PricePoint, TrendingEntry};
use std::cmp::Ordering;
use tracing::debug;

/// Minimum history points on each side before correlating.
pub const MIN_CORRELATION_POINTS: usize = 10;

/// Minimum aligned return pairs for a correlation.
const MIN_ALIGNED_RETURNS: usize = 3;

/// Minimum positive hourly rates for the steadiness check.
const MIN_HOURLY_RATES: usize = 4;

/// Horizon weights for overall performance; longer horizons count more.
pub const PERFORMANCE_WEIGHTS: [(Horizon, f64); 8] = [
    (Horizon::FiveMinutes, 0.5),
    (Horizon::FifteenMinutes, 0.6),
    (Horizon::ThirtyMinutes, 0.7),
    (Horizon::OneHour, 1.0),
    (Horizon::TwoHours, 1.0),
    (Horizon::FourHours, 1.0),
    (Horizon::SevenHours, 1.0),
    (Horizon::TwelveHours, 1.2),
];

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Percentage change between consecutive prices.
fn percent_returns(history: &[PricePoint]) -> Vec<f64> {
    history
        .windows(2)
        .map(|w| (w[1].price - w[0].price) / w[0].price * 100.0)
        .collect()
}

/// Pearson correlation coefficient of two equal-length samples.
/// `None` on zero variance or any non-finite input.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.is_empty() {
        return None;
    }

    let mx = mean(xs);
    let my = mean(ys);
    let (mut cov, mut vx, mut vy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    if vx == 0.0 || vy == 0.0 {
        return None;
    }

    Some(cov / (vx * vy).sqrt()).filter(|r| r.is_finite())
}

/// Trend-level calculators over a price history.
pub struct TrendCalculator {
    config: TrendConfig,
}

impl TrendCalculator {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Percentage change from the price `horizon` ago to `current_price`.
    pub fn growth_rate(
        &self,
        history: &dyn PriceHistory,
        symbol: &str,
        horizon: Horizon,
        current_price: f64,
    ) -> Option<f64> {
        let past = history.price_at(symbol, horizon.minutes())?;
        if past > 0.0 {
            Some((current_price - past) / past * 100.0)
        } else {
            None
        }
    }

    /// Growth rate for every horizon that has a reference price.
    pub fn growth_rates(
        &self,
        history: &dyn PriceHistory,
        symbol: &str,
        current_price: f64,
    ) -> GrowthRates {
        Horizon::ALL
            .into_iter()
            .filter_map(|h| {
                self.growth_rate(history, symbol, h, current_price)
                    .map(|rate| (h, rate))
            })
            .collect()
    }

    /// Steadiness of positive growth across the hourly horizons.
    ///
    /// Needs at least four positive rates whose sorted neighbours are no
    /// further apart than the configured maximum. Scores
    /// `100 - std / mean * 100` (rounded to 1 decimal) and reports it only
    /// when it reaches the configured threshold.
    pub fn consistency_score(&self, growth_rates: &GrowthRates) -> Option<f64> {
        let mut rates: Vec<f64> = growth_rates
            .defined(&Horizon::HOURLY)
            .into_iter()
            .filter(|r| *r > 0.0)
            .collect();

        if rates.len() < MIN_HOURLY_RATES {
            return None;
        }

        rates.sort_by(|a, b| a.total_cmp(b));
        let max_diff = rates
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(0.0, f64::max);
        if max_diff > self.config.consistency_max_diff {
            return None;
        }

        let avg = mean(&rates);
        let consistency = (100.0 - population_std(&rates) / avg * 100.0).max(0.0);

        (consistency >= self.config.consistency_threshold).then(|| round_to(consistency, 1))
    }

    /// Pearson correlation (x100) of percentage returns against the
    /// reference symbol over the configured window.
    pub fn correlation(&self, history: &dyn PriceHistory, symbol: &str) -> Option<f64> {
        if symbol == self.config.reference_symbol {
            return Some(100.0);
        }

        let hours = self.config.correlation_window_hours;
        let symbol_history = history.history(symbol, hours);
        let reference_history = history.history(&self.config.reference_symbol, hours);

        if symbol_history.len() < MIN_CORRELATION_POINTS
            || reference_history.len() < MIN_CORRELATION_POINTS
        {
            debug!(
                "Not enough history to correlate {} ({} / {} points)",
                symbol,
                symbol_history.len(),
                reference_history.len()
            );
            return None;
        }

        let symbol_returns = percent_returns(&symbol_history);
        let reference_returns = percent_returns(&reference_history);

        // Align on the most recent returns.
        let n = symbol_returns.len().min(reference_returns.len());
        if n < MIN_ALIGNED_RETURNS {
            return None;
        }
        let xs = &symbol_returns[symbol_returns.len() - n..];
        let ys = &reference_returns[reference_returns.len() - n..];

        pearson(xs, ys).map(|r| r * 100.0)
    }

    /// Weighted mean growth across every defined horizon (2 decimals).
    pub fn overall_performance(growth_rates: &GrowthRates) -> Option<f64> {
        let (weighted_sum, total_weight) = PERFORMANCE_WEIGHTS
            .iter()
            .filter_map(|(h, w)| growth_rates.get(*h).map(|rate| (rate * w, *w)))
            .fold((0.0, 0.0), |(s, t), (v, w)| (s + v, t + w));

        if total_weight > 0.0 {
            Some(round_to(weighted_sum / total_weight, 2))
        } else {
            None
        }
    }

    /// Growth summary for one symbol. `None` when the price is outside the
    /// tracked range (the reference symbol is exempt) or no horizon has a
    /// reference price.
    pub fn trending_entry(
        &self,
        history: &dyn PriceHistory,
        symbol: &str,
        current_price: f64,
    ) -> Option<TrendingEntry> {
        if symbol != self.config.reference_symbol && !self.config.in_price_range(current_price) {
            return None;
        }

        let growth_rates = self.growth_rates(history, symbol, current_price);
        if growth_rates.is_empty() {
            return None;
        }

        let defined: Vec<f64> = growth_rates.iter().map(|(_, r)| r).collect();

        Some(TrendingEntry {
            symbol: symbol.to_string(),
            price: current_price,
            reference_correlation: self.correlation(history, symbol),
            consistency_score: self.consistency_score(&growth_rates),
            overall_performance: Self::overall_performance(&growth_rates),
            avg_growth: mean(&defined),
            growth_rates,
        })
    }

    /// Order by overall performance (best first), falling back to the 7h
    /// rate, then 0. Equal keys keep their input order.
    pub fn sort_trending(entries: &mut [TrendingEntry]) {
        fn key(entry: &TrendingEntry) -> f64 {
            entry
                .overall_performance
                .or_else(|| entry.growth_rates.get(Horizon::SevenHours))
                .unwrap_or(0.0)
        }
        entries.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
    }
}

impl Default for TrendCalculator {
    fn default() -> Self {
        Self::new(TrendConfig::default())
    }
}
