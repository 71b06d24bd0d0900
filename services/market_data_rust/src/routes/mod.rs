//! Route handlers
//!
//! - [`market`]: quote proxy and cached queries
//! - [`stream`]: SSE price streams
//! - [`health`]: liveness and provider status

pub mod health;
pub mod market;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_support {
    use copilot_core::{AggregatorConfig, MarketDataAggregator};
    use std::time::Duration;

    use crate::state::AppState;

    /// Aggregator with no keys and no public stage: synthetic quotes only
    pub fn offline_state() -> AppState {
        let config = AggregatorConfig {
            watch_list: vec!["SPY".into(), "QQQ".into(), "NVDA".into()],
            batch_delay: Duration::ZERO,
            public_quotes: false,
            rng_seed: Some(11),
            ..AggregatorConfig::default()
        };
        AppState::new(MarketDataAggregator::new(config).unwrap())
    }
}
