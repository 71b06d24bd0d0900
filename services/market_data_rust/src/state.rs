//! Shared handler state

use copilot_core::MarketDataAggregator;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: MarketDataAggregator,
    started_at: Instant,
}

impl AppState {
    pub fn new(aggregator: MarketDataAggregator) -> Self {
        Self {
            aggregator,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
