//! Copilot Core - market data aggregation for the quant research copilot.
//!
//! This module provides:
//! - Equity quotes through a provider fallback chain (Alpha Vantage → Polygon → Yahoo → synthetic)
//! - A per-symbol quote cache with push subscriptions
//! - Keyword-classified market news with a canned fallback feed
//! - A simulated economic indicator table (VIX, 10Y Treasury, DXY, Gold)
//! - Background polling loops with batching and fetch cooldowns

mod types;

pub mod aggregator;
pub mod clients;
pub mod config;
pub mod indicators;
pub mod news;
pub mod utils;

pub use aggregator::{AggregatorTasks, MarketDataAggregator, PriceCallback, Subscription, MARKET_INDICES};
pub use config::{AggregatorConfig, ProviderKeys};
pub use indicators::EconomicIndicators;
pub use types::*;
