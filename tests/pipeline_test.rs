//! Ranking pass tests: catalog + market snapshot -> ranked symbols.

use std::collections::BTreeMap;
use std::path::PathBuf;
use trendscope::services::{FeatureCatalog, FeatureSelector, MarketSnapshot, PriceHistory, Ranker};
use trendscope::{Candle, Config, Horizon, PricePoint, TradingSignal, TrendConfig};

const NOW: i64 = 1_700_000_000_000;
const MINUTE: i64 = 60_000;

const CATALOG_CSV: &str = "\
symbol,timeframe,top_features,win_rate,sharpe_ratio,profitability_score
ALPHAUSDT,15m,\"rsi, macd_hist_lag3, bb_position, ichimoku\",0.61,1.4,2.2
ALPHAUSDT,1h,\"atr_ratio\",0.52,0.9,3.0
";

fn config() -> Config {
    Config {
        catalog_path: None,
        snapshot_path: PathBuf::from("unused.json"),
        scoring_interval: "15m".to_string(),
        candle_limit: 100,
        concurrency_limit: 4,
        symbol_timeout_ms: 10_000,
        cache_ttl_secs: 30,
        trend: TrendConfig::default(),
    }
}

/// Close oscillates upward; volume alternates.
fn create_wavy_candles(count: usize, base: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let drift = 1.0 + i as f64 * 0.002;
            let wave = if i % 3 == 0 { 0.99 } else { 1.006 };
            let close = base * drift * wave;
            Candle {
                timestamp: NOW - (count - i) as i64 * 15 * MINUTE,
                open: close / 1.001,
                high: close * 1.004,
                low: close / 1.005,
                close,
                volume: if i % 2 == 0 { 800.0 } else { 1_400.0 },
                trade_count: 50 + (i % 4) as u64 * 5,
            }
        })
        .collect()
}

/// Current price plus one observation per horizon giving `rates`.
fn price_points(price: f64, rates: &[(Horizon, f64)]) -> Vec<PricePoint> {
    let mut points = vec![PricePoint::new(NOW, price)];
    for (horizon, rate) in rates {
        points.push(PricePoint::new(
            NOW - horizon.minutes() * MINUTE,
            price / (1.0 + rate / 100.0),
        ));
    }
    points
}

fn snapshot() -> MarketSnapshot {
    let rising = [
        (Horizon::FiveMinutes, 3.5),
        (Horizon::FifteenMinutes, 5.5),
        (Horizon::ThirtyMinutes, 7.5),
        (Horizon::OneHour, 10.5),
        (Horizon::TwoHours, 11.0),
        (Horizon::FourHours, 12.0),
        (Horizon::SevenHours, 13.0),
        (Horizon::TwelveHours, 14.0),
    ];
    let sliding = [
        (Horizon::FiveMinutes, -0.5),
        (Horizon::FifteenMinutes, -1.5),
        (Horizon::ThirtyMinutes, 0.4),
        (Horizon::OneHour, 0.8),
    ];

    let mut prices = BTreeMap::new();
    prices.insert("ALPHAUSDT".to_string(), price_points(0.5, &rising));
    prices.insert("BETAUSDC".to_string(), price_points(3.0, &sliding));
    prices.insert("BTCUSDT".to_string(), price_points(64_000.0, &[(Horizon::OneHour, 0.5)]));

    let mut candles = BTreeMap::new();
    for (symbol, base) in [("ALPHAUSDT", 0.4), ("BETAUSDC", 3.0)] {
        let mut by_interval = BTreeMap::new();
        by_interval.insert("15m".to_string(), create_wavy_candles(120, base));
        candles.insert(symbol.to_string(), by_interval);
    }

    MarketSnapshot {
        as_of: Some(NOW),
        prices,
        candles,
    }
}

fn ranker() -> (Ranker, BTreeMap<String, f64>) {
    let catalog = FeatureCatalog::from_reader(CATALOG_CSV.as_bytes()).unwrap();
    let (prices, candles) = snapshot().into_stores();
    let latest = prices.latest_prices();
    let ranker = Ranker::new(&config(), FeatureSelector::new(catalog), prices, candles);
    (ranker, latest)
}

#[tokio::test]
async fn test_ranking_pass() {
    let (ranker, latest) = ranker();
    let ranked = ranker.rank(&latest).await;

    let order: Vec<&str> = ranked.iter().map(|r| r.trend.symbol.as_str()).collect();
    assert_eq!(order, vec!["ALPHAUSDT", "BETAUSDC", "BTCUSDT"]);

    let alpha = &ranked[0];
    let score = alpha.score.as_ref().unwrap();
    assert_eq!(score.growth_score, 100.0);
    assert!(score.composite_score >= 60.0);
    assert_eq!(alpha.trend.growth_rates.len(), 8);
    assert!(alpha.trend.overall_performance.unwrap() > 10.0);

    let beta = &ranked[1];
    let score = beta.score.as_ref().unwrap();
    assert_ne!(score.signal, TradingSignal::Dead);
    assert_eq!(score.reasons[0], "2 timeframes showing negative growth");
    assert_eq!(score.consistency_score, 0.0);
}

#[tokio::test]
async fn test_catalog_features_drive_indicator_map() {
    let (ranker, latest) = ranker();
    let ranked = ranker.rank(&latest).await;

    let alpha = ranked.iter().find(|r| r.trend.symbol == "ALPHAUSDT").unwrap();
    let indicators = alpha.indicators.as_ref().unwrap();
    assert_eq!(indicators.timeframe, "15m");
    assert!(indicators.get("rsi").is_some());
    assert!(indicators.get("macd_hist_lag3").is_some());
    assert!(indicators.get("bb_position").is_some());
    assert!(indicators.get("ichimoku").is_none());
    // Universal features are not requested for a catalogued symbol.
    assert!(indicators.get("returns_std_50").is_none());

    let beta = ranked.iter().find(|r| r.trend.symbol == "BETAUSDC").unwrap();
    let indicators = beta.indicators.as_ref().unwrap();
    assert!(indicators.get("atr_ratio").is_some());
    assert!(indicators.get("returns_std_50").is_some());
}

#[tokio::test]
async fn test_ranked_output_serializes_flat() {
    let (ranker, latest) = ranker();
    let ranked = ranker.rank(&latest).await;
    let json = serde_json::to_value(&ranked).unwrap();

    let first = &json[0];
    assert_eq!(first["symbol"], "ALPHAUSDT");
    assert!(first["growthRates"]["12h"].is_number());
    assert!(first["score"]["compositeScore"].is_number());
    assert!(first["indicators"]["values"]["rsi"].is_number());
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let json = serde_json::to_string(&snapshot()).unwrap();
    let parsed: MarketSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_of, Some(NOW));
    assert_eq!(parsed.prices["ALPHAUSDT"].len(), 9);
    assert_eq!(parsed.candles["BETAUSDC"]["15m"].len(), 120);
}
