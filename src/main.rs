use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trendscope::services::{FeatureSelector, MarketSnapshot, PriceHistory, Ranker};
use trendscope::Config;

/// Grace period for abandoned blocking tasks once the pass is done.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendscope=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run());
    // Symbols that timed out may still hold blocking threads.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env();
    info!(
        "Starting trendscope (interval {}, {} candles, concurrency {})",
        config.scoring_interval, config.candle_limit, config.concurrency_limit
    );

    let selector = FeatureSelector::from_path(config.catalog_path.as_deref());
    if selector.catalog().is_empty() {
        warn!("Feature catalog is empty, scoring every symbol with universal features");
    }

    let snapshot = MarketSnapshot::load(&config.snapshot_path)?;
    let (prices, candles) = snapshot.into_stores();
    let latest = prices.latest_prices();
    info!("Tracking {} symbols", latest.len());

    let ranker = Ranker::new(&config, selector, prices, candles);
    let ranked = ranker.rank(&latest).await;

    if let Some(top) = ranked.first() {
        info!(
            "Top symbol: {} ({:.2})",
            top.trend.symbol,
            top.composite_score()
        );
    }

    println!("{}", serde_json::to_string_pretty(&ranked)?);
    Ok(())
}
