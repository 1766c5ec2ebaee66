//! Technical indicator features computed from candle series.
//!
//! Every feature is registered by name with its dependencies. Requesting a
//! feature resolves its dependencies first; `<feature>_lagN` names resolve
//! the base feature and shift it.

pub mod base;
pub mod bollinger;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod volatility;
pub mod volume;

pub use base::{CloseOpenRatio, HighLowRatio, Returns, VolumeRatio};
pub use bollinger::{BollingerPosition, BollingerWidth};
pub use macd::{Macd, MacdHist, MacdSignal};
pub use rsi::Rsi;
pub use sma::{PriceSmaRatio, SmaCrossRatio};
pub use volatility::{AtrRatio, ReturnsStat};
pub use volume::{TradeIntensity, VolPercentile, VolumeStat};

use crate::error::{AppError, Result};
use crate::types::{Candle, IndicatorMap};
use self::rolling::RollingStat;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// One optional value per candle; `None` where history is insufficient.
pub type Series = Vec<Option<f64>>;

/// Minimum candles before any feature is computed.
pub const MIN_CANDLES: usize = 50;

/// Features computed for every series regardless of the request.
pub const BASE_METRICS: [&str; 4] = ["returns", "high_low_ratio", "close_open_ratio", "volume_ratio"];

/// Supported lag offsets for `<feature>_lagN`.
pub const LAGS: [usize; 4] = [1, 3, 5, 10];

/// Trait for implementing a named indicator feature.
pub trait Feature: Send + Sync {
    /// Feature name as it appears in catalogs and weight tables.
    fn name(&self) -> &str;

    /// Features that must be present in the frame before `compute`.
    fn dependencies(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Compute the full column for this feature.
    fn compute(&self, frame: &FeatureFrame) -> Result<Series>;
}

/// Candle columns plus every feature computed so far.
#[derive(Debug, Clone, Default)]
pub struct FeatureFrame {
    len: usize,
    columns: BTreeMap<String, Series>,
}

impl FeatureFrame {
    /// Raw columns: open, high, low, close, volume, trades.
    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut columns = BTreeMap::new();
        columns.insert("open".to_string(), rolling::defined(candles.iter().map(|c| c.open)));
        columns.insert("high".to_string(), rolling::defined(candles.iter().map(|c| c.high)));
        columns.insert("low".to_string(), rolling::defined(candles.iter().map(|c| c.low)));
        columns.insert("close".to_string(), rolling::defined(candles.iter().map(|c| c.close)));
        columns.insert("volume".to_string(), rolling::defined(candles.iter().map(|c| c.volume)));
        columns.insert(
            "trades".to_string(),
            rolling::defined(candles.iter().map(|c| c.trade_count as f64)),
        );

        Self {
            len: candles.len(),
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns.get(name)
    }

    /// Column lookup for compute functions; a missing dependency is a
    /// computation failure for `feature`.
    pub fn require(&self, feature: &str, name: &str) -> Result<&Series> {
        self.column(name)
            .ok_or_else(|| AppError::computation(feature, format!("missing column {}", name)))
    }

    /// Value of a column at the last row.
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.columns.get(name)?.last().copied().flatten()
    }

    pub fn insert(&mut self, name: &str, series: Series) {
        self.columns.insert(name.to_string(), series);
    }
}

/// Get all available features.
pub fn all_features() -> Vec<Box<dyn Feature>> {
    let mut features: Vec<Box<dyn Feature>> = vec![
        // Base metrics
        Box::new(Returns),
        Box::new(HighLowRatio),
        Box::new(CloseOpenRatio),
        Box::new(VolumeRatio),
        // Volatility
        Box::new(AtrRatio::default()),
        // Trend
        Box::new(Macd::default()),
        Box::new(MacdSignal::default()),
        Box::new(MacdHist),
        Box::new(PriceSmaRatio::new(7)),
        Box::new(PriceSmaRatio::new(25)),
        Box::new(SmaCrossRatio::default()),
        // Momentum
        Box::new(Rsi::new(14)),
        Box::new(Rsi::new(7)),
        // Bands
        Box::new(BollingerWidth::default()),
        Box::new(BollingerPosition::default()),
        // Activity
        Box::new(TradeIntensity::default()),
        Box::new(VolPercentile::default()),
    ];

    for window in [10, 20, 50] {
        for stat in [RollingStat::Std, RollingStat::Mean] {
            features.push(Box::new(ReturnsStat::new(window, stat)));
            features.push(Box::new(VolumeStat::new(window, stat)));
        }
    }

    features
}

fn ensure_min_candles(count: usize) -> Result<()> {
    if count < MIN_CANDLES {
        return Err(AppError::InsufficientData(format!(
            "{} candles (need {})",
            count, MIN_CANDLES
        )));
    }
    Ok(())
}

/// Split `<base>_lagN` into its base name and lag.
pub fn parse_lag(name: &str) -> Option<(&str, usize)> {
    LAGS.iter().find_map(|lag| {
        name.strip_suffix(&format!("_lag{}", lag))
            .filter(|base| !base.is_empty())
            .map(|base| (base, *lag))
    })
}

/// Name-keyed feature registry.
pub struct FeatureRegistry {
    features: HashMap<String, Box<dyn Feature>>,
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::new(all_features())
    }
}

impl FeatureRegistry {
    pub fn new(features: Vec<Box<dyn Feature>>) -> Self {
        Self {
            features: features
                .into_iter()
                .map(|f| (f.name().to_string(), f))
                .collect(),
        }
    }

    /// True if the name (or its lag base) is computable.
    pub fn supports(&self, name: &str) -> bool {
        match parse_lag(name) {
            Some((base, _)) => self.supports(base),
            None => self.features.contains_key(name),
        }
    }

    /// Ensure `name` is present in the frame, computing dependencies first.
    pub fn resolve(&self, frame: &mut FeatureFrame, name: &str) -> Result<()> {
        if frame.contains(name) {
            return Ok(());
        }

        if let Some((base, lag)) = parse_lag(name) {
            self.resolve(frame, base)?;
            let shifted = rolling::shift(frame.require(name, base)?, lag);
            frame.insert(name, shifted);
            return Ok(());
        }

        let feature = self
            .features
            .get(name)
            .ok_or_else(|| AppError::UnknownFeature(name.to_string()))?;

        for dep in feature.dependencies() {
            self.resolve(frame, dep)?;
        }

        let series = feature.compute(frame)?;
        if let Some(Some(latest)) = series.last() {
            if !latest.is_finite() {
                return Err(AppError::computation(name, format!("non-finite value {}", latest)));
            }
        }

        frame.insert(name, series);
        Ok(())
    }
}

/// Derives indicator features from candle series.
#[derive(Default)]
pub struct IndicatorCalculator {
    registry: FeatureRegistry,
}

impl IndicatorCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute base metrics and the requested features. Series shorter than
    /// `MIN_CANDLES` come back with only the raw candle columns.
    pub fn calculate(&self, candles: &[Candle], features: &[String]) -> FeatureFrame {
        let mut frame = FeatureFrame::from_candles(candles);
        if let Err(e) = ensure_min_candles(candles.len()) {
            debug!("{}, skipping indicator calculation", e);
            return frame;
        }

        for name in BASE_METRICS.iter().copied().chain(features.iter().map(String::as_str)) {
            match self.registry.resolve(&mut frame, name) {
                Ok(()) => {}
                Err(AppError::UnknownFeature(f)) => debug!("Ignoring unsupported feature {}", f),
                Err(e) => warn!("Failed to calculate feature {}: {}", name, e),
            }
        }

        frame
    }

    /// Latest value of every requested feature plus candle metadata.
    /// Returns `None` only for an empty series.
    pub fn indicator_map(
        &self,
        symbol: &str,
        timeframe: &str,
        candles: &[Candle],
        features: &[String],
    ) -> Option<IndicatorMap> {
        let last = candles.last()?;
        let frame = self.calculate(candles, features);

        let mut map = IndicatorMap::new(symbol, timeframe, last.timestamp, last.close);
        for feature in features {
            if let Some(value) = frame.latest(feature) {
                map.insert(feature, value);
            }
        }

        debug!(
            "Calculated {}/{} indicators for {} {}",
            map.len(),
            features.len(),
            symbol,
            timeframe
        );
        Some(map)
    }
}
