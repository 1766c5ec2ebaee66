use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Parameters for the trend-level calculators (correlation, hourly
/// consistency, symbol filtering).
#[derive(Debug, Clone)]
pub struct TrendConfig {
    /// Asset every symbol is correlated against.
    pub reference_symbol: String,
    /// History window for correlation, in hours.
    pub correlation_window_hours: f64,
    /// Minimum hourly consistency score worth reporting.
    pub consistency_threshold: f64,
    /// Maximum gap (percentage points) between adjacent sorted hourly rates.
    pub consistency_max_diff: f64,
    /// Inclusive (min, max) price band for tracked symbols.
    pub price_range: (f64, f64),
    /// Quote assets a tracked symbol must end with.
    pub target_quotes: Vec<String>,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            reference_symbol: "BTCUSDT".to_string(),
            correlation_window_hours: 24.0,
            consistency_threshold: 55.0,
            consistency_max_diff: 5.0,
            price_range: (0.001, 10.0),
            target_quotes: vec!["USDT".to_string(), "USDC".to_string()],
        }
    }
}

impl TrendConfig {
    /// True if the price falls inside the configured band.
    pub fn in_price_range(&self, price: f64) -> bool {
        price >= self.price_range.0 && price <= self.price_range.1
    }

    /// True if the symbol is quoted in one of the target assets.
    pub fn has_target_quote(&self, symbol: &str) -> bool {
        self.target_quotes
            .iter()
            .any(|q| symbol.len() > q.len() && symbol.ends_with(q.as_str()))
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// CSV of profitable (symbol, timeframe, features) configurations.
    pub catalog_path: Option<PathBuf>,
    /// JSON market snapshot consumed by the binary.
    pub snapshot_path: PathBuf,
    /// Candle interval used for technical scoring.
    pub scoring_interval: String,
    /// Number of candles requested per symbol.
    pub candle_limit: usize,
    /// Maximum symbol pipelines in flight.
    pub concurrency_limit: usize,
    /// Per-symbol pipeline timeout (ms).
    pub symbol_timeout_ms: u64,
    /// Indicator cache TTL (seconds).
    pub cache_ttl_secs: u64,
    pub trend: TrendConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = TrendConfig::default();

        let target_quotes = env::var("TARGET_QUOTES")
            .ok()
            .map(|s| parse_list(&s))
            .filter(|quotes| !quotes.is_empty())
            .unwrap_or(defaults.target_quotes);

        Self {
            catalog_path: env::var("CATALOG_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/snapshot.json")),
            scoring_interval: env::var("SCORING_INTERVAL").unwrap_or_else(|_| "15m".to_string()),
            candle_limit: env_or("CANDLE_LIMIT", 100),
            concurrency_limit: env_or::<usize>("MAX_CONCURRENT_REQUESTS", 10).max(1),
            symbol_timeout_ms: env_or("SYMBOL_TIMEOUT_MS", 10_000),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", 30),
            trend: TrendConfig {
                reference_symbol: env::var("REFERENCE_SYMBOL")
                    .unwrap_or(defaults.reference_symbol),
                correlation_window_hours: env_or(
                    "CORRELATION_WINDOW_HOURS",
                    defaults.correlation_window_hours,
                ),
                consistency_threshold: env_or(
                    "CONSISTENCY_THRESHOLD",
                    defaults.consistency_threshold,
                ),
                consistency_max_diff: env_or("CONSISTENCY_MAX_DIFF", defaults.consistency_max_diff),
                price_range: (
                    env_or("PRICE_RANGE_MIN", defaults.price_range.0),
                    env_or("PRICE_RANGE_MAX", defaults.price_range.1),
                ),
                target_quotes,
            },
        }
    }

    pub fn symbol_timeout(&self) -> Duration {
        Duration::from_millis(self.symbol_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Read and parse an env var, falling back on absence or parse failure.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
