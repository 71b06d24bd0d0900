//! MarketDataAggregator: cache, subscriptions and polling loops.
//!
//! Owns:
//! - one cached `PricePoint` per symbol (last write wins)
//! - the subscriber registry, notified in registration order
//! - the news cache, replaced wholesale on every refresh
//! - the economic indicator table, ticked once per price sweep
//!
//! Symbols outside the watch-list keep cache and fetch state only while they
//! have subscribers.
//!
//! Consumers never see an error: every path ends in the synthetic generator.
//! Construct one instance at the composition root and share it by cloning;
//! all state sits behind `Arc`s.

use anyhow::{Context, Result};
use chrono::Utc;
use futures_util::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clients::{
    build_http_client, ChainedQuoteProvider, NewsApiClient, ProviderHealth, SyntheticQuoteGenerator,
};
use crate::config::AggregatorConfig;
use crate::indicators::EconomicIndicators;
use crate::news::canned_headlines;
use crate::types::{EconomicIndicator, NewsItem, PricePoint};

/// Symbols reported by [`MarketDataAggregator::get_market_indices`]
pub const MARKET_INDICES: [&str; 3] = ["SPY", "QQQ", "VIX"];

pub type PriceCallback = Arc<dyn Fn(&PricePoint) + Send + Sync>;

/// symbol -> subscriber id -> callback; ids are monotonic so BTreeMap order is
/// registration order
type Registry = HashMap<String, BTreeMap<u64, PriceCallback>>;

/// Handle returned by [`MarketDataAggregator::subscribe`]
///
/// Dropping it does not unsubscribe; call [`Subscription::unsubscribe`].
pub struct Subscription {
    symbol: String,
    id: u64,
    aggregator: MarketDataAggregator,
}

impl Subscription {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Detach the callback from future notifications. Safe to call repeatedly.
    pub fn unsubscribe(&self) {
        self.aggregator.remove_subscriber(&self.symbol, self.id);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("symbol", &self.symbol)
            .field("id", &self.id)
            .finish()
    }
}

/// Join handles for the background loops
pub struct AggregatorTasks {
    pub prices: JoinHandle<()>,
    pub news: JoinHandle<()>,
}

impl AggregatorTasks {
    pub fn abort(&self) {
        self.prices.abort();
        self.news.abort();
    }
}

#[derive(Clone)]
pub struct MarketDataAggregator {
    config: Arc<AggregatorConfig>,
    chain: Arc<ChainedQuoteProvider>,
    news_client: Option<Arc<NewsApiClient>>,

    // Shared state
    cache: Arc<RwLock<HashMap<String, PricePoint>>>,
    subscribers: Arc<RwLock<Registry>>,
    next_subscriber_id: Arc<AtomicU64>,
    news: Arc<RwLock<Vec<NewsItem>>>,
    indicators: Arc<Mutex<EconomicIndicators>>,

    // Fetch gating
    last_fetch: Arc<Mutex<HashMap<String, Instant>>>,
    fetch_locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,

    started: Arc<AtomicBool>,
}

impl MarketDataAggregator {
    /// Build the provider chain, news client and indicator table from config
    pub fn new(config: AggregatorConfig) -> Result<Self> {
        let client = build_http_client(config.http_timeout).context("Failed to create HTTP client")?;

        let (generator, indicators) = match config.rng_seed {
            Some(seed) => (
                SyntheticQuoteGenerator::with_seed(config.synthetic_drift, seed),
                EconomicIndicators::with_seed(seed.wrapping_add(1)),
            ),
            None => (
                SyntheticQuoteGenerator::new(config.synthetic_drift),
                EconomicIndicators::new(),
            ),
        };

        let chain = ChainedQuoteProvider::from_keys(
            client.clone(),
            &config.keys,
            config.public_quotes,
            generator,
        );

        let news_client = match &config.keys.news_api {
            Some(key) => Some(NewsApiClient::new(client, key.clone())),
            None => {
                debug!("NEWS_API_KEY not set, news feed will use canned headlines");
                None
            }
        };

        Ok(Self::with_parts(config, chain, news_client, indicators))
    }

    /// Assemble from pre-built parts
    pub fn with_parts(
        config: AggregatorConfig,
        chain: ChainedQuoteProvider,
        news_client: Option<NewsApiClient>,
        indicators: EconomicIndicators,
    ) -> Self {
        Self {
            config: Arc::new(config),
            chain: Arc::new(chain),
            news_client: news_client.map(Arc::new),
            cache: Arc::new(RwLock::new(HashMap::new())),
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            next_subscriber_id: Arc::new(AtomicU64::new(0)),
            news: Arc::new(RwLock::new(Vec::new())),
            indicators: Arc::new(Mutex::new(indicators)),
            last_fetch: Arc::new(Mutex::new(HashMap::new())),
            fetch_locks: Arc::new(Mutex::new(HashMap::new())),
            started: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Public query interface
    // ------------------------------------------------------------------

    /// Register `callback` for every future point of `symbol`.
    ///
    /// The callback also gets one initial point on a spawned task: the cached
    /// one if present, otherwise a freshly fetched (possibly synthetic) one.
    /// The initial point is read and delivered under the symbol's fetch lock,
    /// so a concurrent refresh can never be followed by an older point.
    /// Must be called from within a Tokio runtime.
    pub fn subscribe<F>(&self, symbol: &str, callback: F) -> Subscription
    where
        F: Fn(&PricePoint) + Send + Sync + 'static,
    {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let callback: PriceCallback = Arc::new(callback);

        self.subscribers
            .write()
            .entry(symbol.to_string())
            .or_default()
            .insert(id, callback.clone());

        debug!("Subscriber {} registered for {}", id, symbol);

        let this = self.clone();
        let symbol_owned = symbol.to_string();
        tokio::spawn(async move {
            {
                let lock = this.fetch_lock(&symbol_owned);
                let _guard = lock.lock().await;

                // Unsubscribed before the first delivery
                if this.is_subscribed(&symbol_owned, id) {
                    let point = match this.get_current_price(&symbol_owned) {
                        Some(cached) => cached,
                        None => this.fetch_and_cache_locked(&symbol_owned).await,
                    };
                    deliver(&symbol_owned, &callback, &point);
                }
            }
            // An unsubscribe that raced this task skipped eviction
            this.evict_if_idle(&symbol_owned);
        });

        Subscription {
            symbol: symbol.to_string(),
            id,
            aggregator: self.clone(),
        }
    }

    /// Cached point for `symbol`; never performs I/O
    pub fn get_current_price(&self, symbol: &str) -> Option<PricePoint> {
        self.cache.read().get(symbol).cloned()
    }

    /// Snapshot of the news cache
    pub fn get_market_news(&self) -> Vec<NewsItem> {
        self.news.read().clone()
    }

    /// Snapshot of all tracked indicators in registration order
    pub fn get_economic_indicators(&self) -> Vec<EconomicIndicator> {
        self.indicators.lock().snapshot()
    }

    /// SPY, QQQ and VIX from the cache, synthesizing any not yet fetched.
    /// Synthesized points are not cached.
    pub fn get_market_indices(&self) -> Vec<PricePoint> {
        MARKET_INDICES
            .iter()
            .map(|symbol| {
                self.get_current_price(symbol)
                    .unwrap_or_else(|| self.chain.synthetic_quote(symbol, None))
            })
            .collect()
    }

    pub fn provider_statuses(&self) -> Vec<ProviderHealth> {
        self.chain.statuses()
    }

    pub fn subscriber_count(&self, symbol: &str) -> usize {
        self.subscribers.read().get(symbol).map_or(0, |s| s.len())
    }

    /// One-off quote straight through the provider chain, bypassing cache and
    /// cooldown. Backs the stateless proxy endpoint.
    pub async fn quote(&self, symbol: &str) -> PricePoint {
        self.chain.fetch_quote(symbol, None).await
    }

    // ------------------------------------------------------------------
    // Polling
    // ------------------------------------------------------------------

    /// Spawn the price and news loops. Only the first call starts anything.
    pub fn start(&self) -> Option<AggregatorTasks> {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("MarketDataAggregator already started");
            return None;
        }

        info!(
            "Starting market data loops: {} symbols every {:?}, news every {:?}",
            self.config.watch_list.len(),
            self.config.price_interval,
            self.config.news_interval
        );

        let this = self.clone();
        let prices = tokio::spawn(async move {
            let period = this.config.price_interval;
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                this.run_price_tick().await;
            }
        });

        let this = self.clone();
        let news = tokio::spawn(async move {
            // First tick fires immediately and doubles as the initial load
            let mut ticker = interval(this.config.news_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                this.refresh_news().await;
            }
        });

        Some(AggregatorTasks { prices, news })
    }

    /// One full price sweep followed by an indicator tick
    pub async fn run_price_tick(&self) {
        self.refresh_prices().await;
        self.indicators.lock().tick(Utc::now());
    }

    /// Refresh the watch-list in rate-limited batches
    pub async fn refresh_prices(&self) {
        let batches: Vec<&[String]> = self.config.watch_list.chunks(self.config.batch_size.max(1)).collect();
        let last = batches.len().saturating_sub(1);

        for (index, batch) in batches.into_iter().enumerate() {
            join_all(batch.iter().map(|symbol| self.refresh_symbol(symbol))).await;

            if index < last && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }
    }

    /// Fetch one symbol, replace its cache entry and notify its subscribers.
    /// The entry is only retained for watch-list or subscribed symbols.
    pub async fn refresh_symbol(&self, symbol: &str) -> PricePoint {
        let point = {
            let lock = self.fetch_lock(symbol);
            let _guard = lock.lock().await;

            let point = self.fetch_and_cache_locked(symbol).await;
            self.publish(symbol, &point);
            point
        };
        self.evict_if_idle(symbol);
        point
    }

    /// Reload the news cache from NewsAPI, or canned headlines on any failure
    pub async fn refresh_news(&self) {
        let items = match &self.news_client {
            Some(client) => match client.fetch_headlines().await {
                Ok(items) if !items.is_empty() => items,
                Ok(_) => {
                    debug!("NewsAPI returned no usable articles, using canned headlines");
                    canned_headlines(Utc::now())
                }
                Err(e) => {
                    warn!("News refresh failed: {}", e);
                    canned_headlines(Utc::now())
                }
            },
            None => canned_headlines(Utc::now()),
        };

        debug!("News cache replaced with {} items", items.len());
        *self.news.write() = items;
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn fetch_lock(&self, symbol: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.fetch_locks
            .lock()
            .entry(symbol.to_string())
            .or_default()
            .clone()
    }

    /// Caller holds the per-symbol fetch lock
    async fn fetch_and_cache_locked(&self, symbol: &str) -> PricePoint {
        if let Some(cached) = self.cooldown_hit(symbol) {
            debug!("{} inside fetch cooldown, serving cached quote", symbol);
            return cached;
        }

        let previous = self.get_current_price(symbol).map(|p| p.price);
        let point = self.chain.fetch_quote(symbol, previous).await;

        self.last_fetch.lock().insert(symbol.to_string(), Instant::now());
        self.cache.write().insert(symbol.to_string(), point.clone());
        point
    }

    fn cooldown_hit(&self, symbol: &str) -> Option<PricePoint> {
        let fetched_at = *self.last_fetch.lock().get(symbol)?;
        if fetched_at.elapsed() < self.config.fetch_cooldown {
            self.get_current_price(symbol)
        } else {
            None
        }
    }

    fn remove_subscriber(&self, symbol: &str, id: u64) {
        {
            let mut registry = self.subscribers.write();
            if let Some(callbacks) = registry.get_mut(symbol) {
                callbacks.remove(&id);
                if callbacks.is_empty() {
                    registry.remove(symbol);
                }
            }
        }
        self.evict_if_idle(symbol);
    }

    /// Drop cache and fetch state for a symbol nobody watches any more.
    ///
    /// Watch-list symbols are kept. A held or queued fetch lock defers
    /// eviction to whoever holds it.
    fn evict_if_idle(&self, symbol: &str) {
        if self.config.watch_list.iter().any(|s| s == symbol) {
            return;
        }

        // Held across the checks so no new fetch can grab the lock meanwhile
        let mut locks = self.fetch_locks.lock();
        if locks.get(symbol).is_some_and(|lock| Arc::strong_count(lock) > 1) {
            return;
        }
        if self.subscriber_count(symbol) > 0 {
            return;
        }

        locks.remove(symbol);
        self.last_fetch.lock().remove(symbol);
        if self.cache.write().remove(symbol).is_some() {
            debug!("Evicted idle symbol {}", symbol);
        }
    }

    fn is_subscribed(&self, symbol: &str, id: u64) -> bool {
        self.subscribers
            .read()
            .get(symbol)
            .is_some_and(|callbacks| callbacks.contains_key(&id))
    }

    /// Notify subscribers of `symbol` in registration order
    fn publish(&self, symbol: &str, point: &PricePoint) {
        let callbacks: Vec<PriceCallback> = match self.subscribers.read().get(symbol) {
            Some(callbacks) => callbacks.values().cloned().collect(),
            None => return,
        };

        for callback in &callbacks {
            deliver(symbol, callback, point);
        }
    }
}

/// Invoke one callback, containing any panic to that subscriber
fn deliver(symbol: &str, callback: &PriceCallback, point: &PricePoint) {
    if catch_unwind(AssertUnwindSafe(|| callback(point))).is_err() {
        warn!("Subscriber callback for {} panicked; continuing delivery", symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::error::ProviderResult;
    use crate::clients::quote_provider::{ProviderStatus, QuoteProvider};
    use crate::clients::synthetic::SyntheticDrift;
    use crate::types::PriceSource;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QuoteProvider for CountingProvider {
        fn provider_name(&self) -> &str {
            "Counting"
        }

        fn status(&self) -> ProviderStatus {
            ProviderStatus::Healthy
        }

        async fn fetch_quote(&self, symbol: &str) -> ProviderResult<PricePoint> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as f64;
            Ok(PricePoint::from_reference(symbol, 50.0 + n, 50.0, 10, PriceSource::Polygon))
        }
    }

    fn test_config() -> AggregatorConfig {
        AggregatorConfig {
            watch_list: vec!["SPY".to_string(), "AAPL".to_string(), "ZZZZ".to_string()],
            batch_delay: Duration::ZERO,
            public_quotes: false,
            rng_seed: Some(7),
            ..AggregatorConfig::default()
        }
    }

    fn synthetic_aggregator() -> MarketDataAggregator {
        synthetic_aggregator_with(test_config())
    }

    fn synthetic_aggregator_with(config: AggregatorConfig) -> MarketDataAggregator {
        let chain = ChainedQuoteProvider::synthetic_only(SyntheticQuoteGenerator::with_seed(
            SyntheticDrift::RandomWalk,
            7,
        ));
        MarketDataAggregator::with_parts(config, chain, None, EconomicIndicators::with_seed(8))
    }

    fn counting_aggregator() -> (MarketDataAggregator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let providers: Vec<Arc<dyn QuoteProvider>> = vec![Arc::new(CountingProvider { calls: calls.clone() })];
        let chain = ChainedQuoteProvider::new(
            providers,
            SyntheticQuoteGenerator::with_seed(SyntheticDrift::RandomWalk, 7),
        );
        let aggregator =
            MarketDataAggregator::with_parts(test_config(), chain, None, EconomicIndicators::with_seed(8));
        (aggregator, calls)
    }

    fn channel_callback(tx: mpsc::UnboundedSender<PricePoint>) -> impl Fn(&PricePoint) + Send + Sync {
        move |point: &PricePoint| {
            let _ = tx.send(point.clone());
        }
    }

    #[tokio::test]
    async fn test_subscribe_unknown_symbol_gets_synthetic() {
        let aggregator = synthetic_aggregator();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _sub = aggregator.subscribe("ZZZZ", channel_callback(tx));

        let point = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(point.symbol, "ZZZZ");
        assert_eq!(point.source, PriceSource::Synthetic);
        assert!(point.price >= 98.49 && point.price <= 101.51);
        assert_eq!(aggregator.get_current_price("ZZZZ"), Some(point));
    }

    #[tokio::test]
    async fn test_subscribe_delivers_cached_value() {
        let aggregator = synthetic_aggregator();
        let cached = aggregator.refresh_symbol("AAPL").await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = aggregator.subscribe("AAPL", channel_callback(tx));

        let point = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(point, cached);
    }

    #[tokio::test]
    async fn test_cache_matches_last_delivery() {
        let aggregator = synthetic_aggregator();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = aggregator.subscribe("SPY", channel_callback(tx));
        rx.recv().await.unwrap();

        // Step past the cooldown each time so every refresh is a new quote
        for _ in 0..3 {
            aggregator.last_fetch.lock().clear();
            aggregator.refresh_symbol("SPY").await;
            let delivered = rx.recv().await.unwrap();
            assert_eq!(aggregator.get_current_price("SPY"), Some(delivered));
        }
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let aggregator = synthetic_aggregator();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        let sub_a = aggregator.subscribe("AAPL", channel_callback(tx_a));
        let _sub_b = aggregator.subscribe("AAPL", channel_callback(tx_b));
        rx_a.recv().await.unwrap();
        rx_b.recv().await.unwrap();

        sub_a.unsubscribe();
        sub_a.unsubscribe();
        assert_eq!(aggregator.subscriber_count("AAPL"), 1);

        let (tx_c, mut rx_c) = mpsc::unbounded_channel();
        let _sub_c = aggregator.subscribe("AAPL", channel_callback(tx_c));
        rx_c.recv().await.unwrap();

        aggregator.refresh_symbol("AAPL").await;
        assert!(rx_b.recv().await.is_some());
        assert!(rx_c.recv().await.is_some());
        assert!(rx_a.try_recv().is_err());
        assert_eq!(aggregator.subscriber_count("AAPL"), 2);
    }

    #[tokio::test]
    async fn test_unsubscribe_before_first_delivery() {
        let aggregator = synthetic_aggregator();
        let (tx, mut rx) = mpsc::unbounded_channel();

        // Current-thread runtime: the spawned delivery cannot run before this
        let sub = aggregator.subscribe("ZZZZ", channel_callback(tx));
        sub.unsubscribe();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_initial_delivery_never_trails_concurrent_refresh() {
        let aggregator = synthetic_aggregator_with(AggregatorConfig {
            fetch_cooldown: Duration::ZERO,
            ..test_config()
        });
        aggregator.refresh_symbol("AAPL").await;

        for _ in 0..200 {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let sub = aggregator.subscribe("AAPL", channel_callback(tx));

            let refresher = aggregator.clone();
            tokio::spawn(async move { refresher.refresh_symbol("AAPL").await })
                .await
                .unwrap();

            // One initial point plus one published point, in either order
            rx.recv().await.unwrap();
            let last = rx.recv().await.unwrap();
            assert_eq!(aggregator.get_current_price("AAPL"), Some(last));
            sub.unsubscribe();
        }
    }

    #[tokio::test]
    async fn test_last_unsubscribe_evicts_unwatched_symbol() {
        let aggregator = synthetic_aggregator();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let sub = aggregator.subscribe("QQQ", channel_callback(tx));
        rx.recv().await.unwrap();
        assert!(aggregator.get_current_price("QQQ").is_some());

        sub.unsubscribe();
        assert!(aggregator.get_current_price("QQQ").is_none());
        assert!(!aggregator.last_fetch.lock().contains_key("QQQ"));
        assert!(!aggregator.fetch_locks.lock().contains_key("QQQ"));
    }

    #[tokio::test]
    async fn test_unwatched_symbol_kept_while_subscribed() {
        let aggregator = synthetic_aggregator();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        let sub_a = aggregator.subscribe("QQQ", channel_callback(tx_a));
        let _sub_b = aggregator.subscribe("QQQ", channel_callback(tx_b));
        rx_a.recv().await.unwrap();
        rx_b.recv().await.unwrap();

        sub_a.unsubscribe();
        assert!(aggregator.get_current_price("QQQ").is_some());

        // A one-off refresh of a symbol nobody follows is not retained
        aggregator.refresh_symbol("MSFT").await;
        assert!(aggregator.get_current_price("MSFT").is_none());
    }

    #[tokio::test]
    async fn test_unsubscribe_keeps_watch_list_state() {
        let aggregator = synthetic_aggregator();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let sub = aggregator.subscribe("AAPL", channel_callback(tx));
        let delivered = rx.recv().await.unwrap();
        sub.unsubscribe();

        assert_eq!(aggregator.get_current_price("AAPL"), Some(delivered));
    }

    #[tokio::test]
    async fn test_unsubscribe_racing_initial_fetch_still_evicts() {
        let aggregator = synthetic_aggregator();
        let (tx, _rx) = mpsc::unbounded_channel();

        // Hold the fetch lock so the initial delivery task queues behind it
        let lock = aggregator.fetch_lock("QQQ");
        let guard = lock.lock().await;
        let sub = aggregator.subscribe("QQQ", channel_callback(tx));
        tokio::time::sleep(Duration::from_millis(20)).await;

        sub.unsubscribe();
        assert!(aggregator.fetch_locks.lock().contains_key("QQQ"));

        drop(guard);
        drop(lock);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!aggregator.fetch_locks.lock().contains_key("QQQ"));
        assert!(aggregator.get_current_price("QQQ").is_none());
    }

    #[tokio::test]
    async fn test_notification_order_and_panic_isolation() {
        let aggregator = synthetic_aggregator();
        aggregator.refresh_symbol("SPY").await;

        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subs = Vec::new();
        for index in 0..3 {
            let log = log.clone();
            subs.push(aggregator.subscribe("SPY", move |_: &PricePoint| {
                log.lock().push(index);
                if index == 1 {
                    panic!("subscriber failure");
                }
            }));
        }

        // Let the initial deliveries land
        tokio::time::sleep(Duration::from_millis(50)).await;
        log.lock().clear();

        aggregator.refresh_symbol("SPY").await;
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_suppresses_refetch() {
        let (aggregator, calls) = counting_aggregator();

        let first = aggregator.refresh_symbol("AAPL").await;
        let second = aggregator.refresh_symbol("AAPL").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);

        tokio::time::advance(Duration::from_secs(5)).await;
        let third = aggregator.refresh_symbol("AAPL").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_ne!(first.price, third.price);
    }

    #[tokio::test]
    async fn test_refresh_prices_covers_watch_list() {
        let (aggregator, calls) = counting_aggregator();
        aggregator.refresh_prices().await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        for symbol in ["SPY", "AAPL", "ZZZZ"] {
            assert_eq!(aggregator.get_current_price(symbol).unwrap().source, PriceSource::Polygon);
        }
    }

    #[tokio::test]
    async fn test_price_tick_advances_indicators() {
        let aggregator = synthetic_aggregator();
        let before = aggregator.get_economic_indicators();

        aggregator.run_price_tick().await;
        let after = aggregator.get_economic_indicators();

        assert_eq!(before.len(), 4);
        assert_eq!(after.len(), 4);
        assert!(before.iter().zip(&after).any(|(b, a)| b.value != a.value));
    }

    #[tokio::test]
    async fn test_refresh_news_without_key_uses_canned() {
        let aggregator = synthetic_aggregator();
        assert!(aggregator.get_market_news().is_empty());

        aggregator.refresh_news().await;
        let news = aggregator.get_market_news();
        assert_eq!(news.len(), 5);
        assert!(news[0].id.starts_with("mock_news_"));
    }

    #[tokio::test]
    async fn test_market_indices_do_not_populate_cache() {
        let aggregator = synthetic_aggregator();
        let indices = aggregator.get_market_indices();

        let symbols: Vec<&str> = indices.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["SPY", "QQQ", "VIX"]);
        assert!(aggregator.get_current_price("SPY").is_none());
    }

    #[tokio::test]
    async fn test_start_only_once() {
        let aggregator = synthetic_aggregator();
        let tasks = aggregator.start().unwrap();
        assert!(aggregator.start().is_none());
        tasks.abort();
    }
}
