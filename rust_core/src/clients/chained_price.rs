//! Chained Quote Provider
//!
//! Implements the fallback chain of equity quote providers.
//! Default chain: Alpha Vantage → Polygon → Yahoo → synthetic
//!
//! Keyed stages are only present when their key is configured. The synthetic
//! generator is held outside the fallible list, so `fetch_quote` cannot fail.

use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::alpha_vantage::AlphaVantageClient;
use super::polygon::PolygonClient;
use super::quote_provider::{ProviderStatus, QuoteProvider};
use super::synthetic::SyntheticQuoteGenerator;
use super::yahoo::YahooChartClient;
use crate::config::ProviderKeys;
use crate::types::PricePoint;

/// Name and last observed status of one live stage
#[derive(Debug, Clone, Serialize)]
pub struct ProviderHealth {
    pub provider: String,
    pub status: ProviderStatus,
}

/// A quote source that chains live providers and ends in synthetic data
pub struct ChainedQuoteProvider {
    /// Ordered list of providers to try
    providers: Vec<Arc<dyn QuoteProvider>>,
    /// Guaranteed last stage
    fallback: SyntheticQuoteGenerator,
    /// Chain name for logging
    name: String,
}

impl ChainedQuoteProvider {
    /// Create a chain from an explicit provider list
    pub fn new(providers: Vec<Arc<dyn QuoteProvider>>, fallback: SyntheticQuoteGenerator) -> Self {
        let mut names: Vec<&str> = providers.iter().map(|p| p.provider_name()).collect();
        names.push("Synthetic");
        let name = format!("ChainedQuoteProvider({})", names.join(" → "));

        Self {
            providers,
            fallback,
            name,
        }
    }

    /// Create the default chain for the configured keys.
    ///
    /// Missing keys drop their stage silently; `include_public` controls the
    /// unauthenticated Yahoo stage.
    pub fn from_keys(
        client: Client,
        keys: &ProviderKeys,
        include_public: bool,
        fallback: SyntheticQuoteGenerator,
    ) -> Self {
        let mut providers: Vec<Arc<dyn QuoteProvider>> = Vec::new();

        match &keys.alpha_vantage {
            Some(key) => providers.push(Arc::new(AlphaVantageClient::new(client.clone(), key.clone()))),
            None => debug!("ALPHA_VANTAGE_KEY not set, skipping Alpha Vantage"),
        }
        match &keys.polygon {
            Some(key) => providers.push(Arc::new(PolygonClient::new(client.clone(), key.clone()))),
            None => debug!("POLYGON_KEY not set, skipping Polygon"),
        }
        if include_public {
            providers.push(Arc::new(YahooChartClient::new(client)));
        }

        let chain = Self::new(providers, fallback);
        info!("Quote chain: {}", chain.name);
        chain
    }

    /// Synthetic-only chain
    pub fn synthetic_only(fallback: SyntheticQuoteGenerator) -> Self {
        Self::new(Vec::new(), fallback)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of live (fallible) stages
    pub fn live_stages(&self) -> usize {
        self.providers.len()
    }

    pub fn statuses(&self) -> Vec<ProviderHealth> {
        self.providers
            .iter()
            .map(|p| ProviderHealth {
                provider: p.provider_name().to_string(),
                status: p.status(),
            })
            .collect()
    }

    /// Quote for `symbol` from the first live provider that succeeds, or a
    /// synthetic one built from `previous` when every stage fails.
    pub async fn fetch_quote(&self, symbol: &str, previous: Option<f64>) -> PricePoint {
        for provider in &self.providers {
            match provider.fetch_quote(symbol).await {
                Ok(point) => {
                    debug!(
                        "Got quote for {} from {} (${:.2})",
                        symbol,
                        provider.provider_name(),
                        point.price
                    );
                    return point;
                }
                Err(e) if e.is_transient() => {
                    warn!("{} unavailable for {}: {}", provider.provider_name(), symbol, e);
                }
                Err(e) => {
                    warn!("{} returned no usable quote for {}: {}", provider.provider_name(), symbol, e);
                }
            }
        }

        debug!("All live providers exhausted for {}, using synthetic quote", symbol);
        self.synthetic_quote(symbol, previous)
    }

    /// Synthetic quote without touching the live stages
    pub fn synthetic_quote(&self, symbol: &str, previous: Option<f64>) -> PricePoint {
        self.fallback.generate(symbol, previous)
    }
}
