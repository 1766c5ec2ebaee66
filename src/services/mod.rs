pub mod cache;
pub mod candles;
pub mod features;
pub mod indicators;
pub mod price_history;
pub mod ranker;
pub mod scoring;
pub mod trend;

pub use cache::Cache;
pub use candles::{CandleSource, CandleStore, MarketSnapshot};
pub use features::{FeatureCatalog, FeatureSelector, UNIVERSAL_FEATURES};
pub use indicators::{Feature, FeatureFrame, FeatureRegistry, IndicatorCalculator};
pub use price_history::{PriceHistory, PriceHistoryStore};
pub use ranker::Ranker;
pub use scoring::ScoringEngine;
pub use trend::TrendCalculator;
