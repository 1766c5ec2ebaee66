//! Static weight and threshold tables for technical scoring.
//!
//! Weights are how often a feature appeared in historically profitable
//! configurations (0-1).

/// Feature name -> frequency weight.
pub const FEATURE_WEIGHTS: &[(&str, f64)] = &[
    ("atr_ratio", 0.75),
    ("returns_std_50", 0.63),
    ("volume_mean_50", 0.57),
    ("volume_std_50", 0.51),
    ("volume_std_20", 0.29),
    ("macd_signal", 0.27),
    ("returns_mean_50", 0.25),
    ("macd_hist", 0.20),
    ("returns_std_20", 0.13),
    ("rsi", 0.10),
    ("rsi_7", 0.10),
    ("high_low_ratio", 0.12),
    ("close_open_ratio", 0.08),
    ("bb_width", 0.08),
    ("bb_position", 0.08),
    ("volume_mean_20", 0.15),
    ("volume_mean_10", 0.15),
    ("returns_mean_20", 0.10),
    ("price_sma7_ratio", 0.08),
    ("price_sma25_ratio", 0.08),
    ("trade_intensity", 0.06),
    ("returns", 0.05),
    ("volume_ratio", 0.05),
    ("macd", 0.08),
    ("volume_std_10", 0.10),
    ("returns_mean_10", 0.08),
    ("returns_std_10", 0.08),
];

/// Explicit scoring thresholds for a feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub bullish: f64,
    pub bearish: f64,
    /// Oscillators only: above this the feature reads as overbought.
    pub overbought: Option<f64>,
}

impl Thresholds {
    pub const fn new(bullish: f64, bearish: f64) -> Self {
        Self {
            bullish,
            bearish,
            overbought: None,
        }
    }

    pub const fn oscillator(bullish: f64, bearish: f64, overbought: f64) -> Self {
        Self {
            bullish,
            bearish,
            overbought: Some(overbought),
        }
    }
}

/// Feature name -> thresholds. Features not listed use generic scoring.
pub const FEATURE_THRESHOLDS: &[(&str, Thresholds)] = &[
    ("atr_ratio", Thresholds::new(0.02, 0.005)),
    ("returns_std_50", Thresholds::new(0.02, 0.001)),
    ("volume_mean_50", Thresholds::new(1.2, 0.8)),
    ("volume_std_50", Thresholds::new(0.3, 0.1)),
    ("macd_signal", Thresholds::new(0.0, -0.5)),
    ("rsi", Thresholds::oscillator(50.0, 30.0, 70.0)),
    ("bb_position", Thresholds::new(0.5, 0.2)),
    ("volume_ratio", Thresholds::new(1.5, 0.5)),
    ("trade_intensity", Thresholds::new(1.2, 0.8)),
];
