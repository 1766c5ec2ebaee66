//! One ranking pass: score every tracked symbol and order the results.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::cache::Cache;
use crate::services::candles::CandleSource;
use crate::services::features::FeatureSelector;
use crate::services::indicators::IndicatorCalculator;
use crate::services::price_history::PriceHistory;
use crate::services::scoring::ScoringEngine;
use crate::services::trend::TrendCalculator;
use crate::types::{IndicatorMap, RankedSymbol};
use futures_util::{stream, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Scores symbols against shared, read-only calculators. Cloning is cheap;
/// every clone shares the same collaborators and indicator cache.
#[derive(Clone)]
pub struct Ranker {
    selector: Arc<FeatureSelector>,
    calculator: Arc<IndicatorCalculator>,
    engine: Arc<ScoringEngine>,
    trend: Arc<TrendCalculator>,
    prices: Arc<dyn PriceHistory>,
    candles: Arc<dyn CandleSource>,
    cache: Arc<Cache<IndicatorMap>>,
    interval: String,
    candle_limit: usize,
    concurrency_limit: usize,
    symbol_timeout: Duration,
}

impl Ranker {
    pub fn new(
        config: &Config,
        selector: FeatureSelector,
        prices: Arc<dyn PriceHistory>,
        candles: Arc<dyn CandleSource>,
    ) -> Self {
        Self {
            selector: Arc::new(selector),
            calculator: Arc::new(IndicatorCalculator::new()),
            engine: Arc::new(ScoringEngine::new()),
            trend: Arc::new(TrendCalculator::new(config.trend.clone())),
            prices,
            candles,
            cache: Arc::new(Cache::new(config.cache_ttl())),
            interval: config.scoring_interval.clone(),
            candle_limit: config.candle_limit,
            concurrency_limit: config.concurrency_limit.max(1),
            symbol_timeout: config.symbol_timeout(),
        }
    }

    pub fn cache(&self) -> &Cache<IndicatorMap> {
        &self.cache
    }

    /// True if the symbol is quoted in a target asset and priced inside the
    /// tracked range. The reference symbol always qualifies.
    pub fn is_candidate(&self, symbol: &str, price: f64) -> bool {
        let trend = self.trend.config();
        symbol == trend.reference_symbol
            || (trend.has_target_quote(symbol) && trend.in_price_range(price))
    }

    /// Score every candidate in `latest_prices`, best composite first.
    ///
    /// Each symbol runs on the blocking pool with at most
    /// `concurrency_limit` in flight. A symbol that times out or whose task
    /// fails is left out of the result. A timed-out task keeps its blocking
    /// thread until it returns, so callers that shut the runtime down should
    /// bound the wait (see `Runtime::shutdown_timeout`).
    pub async fn rank(&self, latest_prices: &BTreeMap<String, f64>) -> Vec<RankedSymbol> {
        let started = Instant::now();
        let candidates: Vec<(String, f64)> = latest_prices
            .iter()
            .filter(|(symbol, price)| self.is_candidate(symbol, **price))
            .map(|(symbol, price)| (symbol.clone(), *price))
            .collect();
        let candidate_count = candidates.len();

        let mut ranked: Vec<RankedSymbol> = stream::iter(candidates)
            .map(|(symbol, price)| {
                let ranker = self.clone();
                async move {
                    match ranker.run_symbol(symbol.clone(), price).await {
                        Ok(result) => result,
                        Err(e) => {
                            warn!("Dropping {} from ranking: {}", symbol, e);
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency_limit)
            .filter_map(|result| async move { result })
            .collect()
            .await;

        Self::sort_ranked(&mut ranked);

        info!(
            "Ranked {} of {} candidate symbols ({} scored) in {:?}",
            ranked.len(),
            candidate_count,
            ranked.iter().filter(|r| r.score.is_some()).count(),
            started.elapsed()
        );
        ranked
    }

    /// Run one symbol's pipeline on the blocking pool under the timeout.
    async fn run_symbol(&self, symbol: String, price: f64) -> Result<Option<RankedSymbol>> {
        let ranker = self.clone();
        let label = symbol.clone();
        let task = tokio::task::spawn_blocking(move || ranker.score_symbol(&symbol, price));

        match tokio::time::timeout(self.symbol_timeout, task).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(join_error)) => Err(AppError::Anyhow(anyhow::Error::new(join_error))),
            Err(_) => Err(AppError::Timeout(format!(
                "{} after {:?}",
                label, self.symbol_timeout
            ))),
        }
    }

    /// Full pipeline for one symbol: growth rates, trending entry,
    /// indicators, composite score. `None` if the symbol has no growth data
    /// or falls outside the tracked price range.
    pub fn score_symbol(&self, symbol: &str, price: f64) -> Option<RankedSymbol> {
        let trend = self.trend.trending_entry(self.prices.as_ref(), symbol, price)?;
        let indicators = self.indicators_for(symbol);
        let score = indicators
            .as_ref()
            .map(|map| self.engine.calculate_composite_score(&trend.growth_rates, map));

        Some(RankedSymbol {
            trend,
            indicators,
            score,
        })
    }

    /// Indicator map for the scoring interval, served from the cache while
    /// fresh. `None` when the candle source has no data for the symbol.
    pub fn indicators_for(&self, symbol: &str) -> Option<IndicatorMap> {
        let key = format!("{}:{}", symbol, self.interval);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Using cached indicators for {}", key);
            return Some(cached);
        }

        let candles = self.candles.candles(symbol, &self.interval, self.candle_limit);
        let features = self.selector.get_features(symbol, &self.interval);
        let map = self
            .calculator
            .indicator_map(symbol, &self.interval, &candles, &features)?;

        self.cache.set(key, map.clone());
        Some(map)
    }

    /// Composite score descending; unscored symbols count as 0 and ties
    /// fall back to the symbol name.
    pub fn sort_ranked(ranked: &mut [RankedSymbol]) {
        ranked.sort_by(|a, b| {
            b.composite_score()
                .total_cmp(&a.composite_score())
                .then_with(|| a.trend.symbol.cmp(&b.trend.symbol))
        });
    }
}
