//! Configuration for the market data aggregator

use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;

use crate::clients::synthetic::SyntheticDrift;

pub const DEFAULT_WATCH_LIST: &[&str] = &[
    "SPY", "QQQ", "VIX", "AAPL", "NVDA", "MSFT", "GOOGL", "AMZN", "TSLA", "META",
];

/// Provider API keys; a missing key removes that stage from the chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderKeys {
    pub alpha_vantage: Option<String>,
    pub polygon: Option<String>,
    pub news_api: Option<String>,
}

impl ProviderKeys {
    pub fn from_env() -> Self {
        Self {
            alpha_vantage: non_empty_var("ALPHA_VANTAGE_KEY"),
            polygon: non_empty_var("POLYGON_KEY"),
            news_api: non_empty_var("NEWS_API_KEY"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    // Polling
    pub watch_list: Vec<String>,
    pub price_interval: Duration,
    pub news_interval: Duration,
    pub fetch_cooldown: Duration,
    pub batch_size: usize,
    pub batch_delay: Duration,

    // Providers
    pub keys: ProviderKeys,
    pub http_timeout: Duration,
    /// Include the unauthenticated Yahoo chart stage
    pub public_quotes: bool,

    // Synthetic data
    pub synthetic_drift: SyntheticDrift,
    pub rng_seed: Option<u64>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            watch_list: DEFAULT_WATCH_LIST.iter().map(|s| s.to_string()).collect(),
            price_interval: Duration::from_secs(15),
            news_interval: Duration::from_secs(600),
            fetch_cooldown: Duration::from_secs(5),
            batch_size: 2,
            batch_delay: Duration::from_millis(2000),
            keys: ProviderKeys::default(),
            http_timeout: Duration::from_secs(10),
            public_quotes: true,
            synthetic_drift: SyntheticDrift::RandomWalk,
            rng_seed: None,
        }
    }
}

impl AggregatorConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let watch_list = match env::var("MARKET_WATCH_LIST") {
            Ok(raw) => parse_watch_list(&raw),
            Err(_) => defaults.watch_list,
        };
        if watch_list.is_empty() {
            return Err(anyhow!("MARKET_WATCH_LIST must name at least one symbol"));
        }

        let batch_size = parse_u64("MARKET_BATCH_SIZE", defaults.batch_size as u64)? as usize;
        if batch_size == 0 {
            return Err(anyhow!("MARKET_BATCH_SIZE must be > 0"));
        }

        let price_interval_secs = parse_u64("MARKET_PRICE_INTERVAL_SECS", 15)?;
        if price_interval_secs == 0 {
            return Err(anyhow!("MARKET_PRICE_INTERVAL_SECS must be > 0"));
        }
        let news_interval_secs = parse_u64("MARKET_NEWS_INTERVAL_SECS", 600)?;
        if news_interval_secs == 0 {
            return Err(anyhow!("MARKET_NEWS_INTERVAL_SECS must be > 0"));
        }

        let synthetic_drift = match env::var("MARKET_SYNTHETIC_DRIFT") {
            Ok(raw) => raw.parse().map_err(|e: String| anyhow!("MARKET_SYNTHETIC_DRIFT: {}", e))?,
            Err(_) => defaults.synthetic_drift,
        };

        let rng_seed = match env::var("MARKET_RNG_SEED") {
            Ok(raw) => Some(
                raw.parse()
                    .map_err(|_| anyhow!("MARKET_RNG_SEED must be a valid u64"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            watch_list,
            price_interval: Duration::from_secs(price_interval_secs),
            news_interval: Duration::from_secs(news_interval_secs),
            fetch_cooldown: Duration::from_secs(parse_u64("MARKET_FETCH_COOLDOWN_SECS", 5)?),
            batch_size,
            batch_delay: Duration::from_millis(parse_u64("MARKET_BATCH_DELAY_MS", 2000)?),
            keys: ProviderKeys::from_env(),
            http_timeout: Duration::from_secs(parse_u64("MARKET_HTTP_TIMEOUT_SECS", 10)?),
            public_quotes: parse_bool("MARKET_PUBLIC_QUOTES", true)?,
            synthetic_drift,
            rng_seed,
        })
    }
}

/// Split a comma separated symbol list, uppercasing and dropping blanks
pub fn parse_watch_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty_var(var_name: &str) -> Option<String> {
    env::var(var_name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse environment variable as u64 with default fallback
fn parse_u64(var_name: &str, default: u64) -> Result<u64> {
    match env::var(var_name) {
        Ok(val) => val.parse().map_err(|_| anyhow!("{} must be a valid u64", var_name)),
        Err(_) => Ok(default),
    }
}

/// Parse environment variable as bool with default fallback
fn parse_bool(var_name: &str, default: bool) -> Result<bool> {
    match env::var(var_name) {
        Ok(val) => val
            .to_lowercase()
            .parse()
            .map_err(|_| anyhow!("{} must be true or false", var_name)),
        Err(_) => Ok(default),
    }
}
