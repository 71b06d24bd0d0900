//! Polygon.io API Client
//!
//! Keyed previous-day aggregates endpoint. Change is measured from the bar's
//! open to its close.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::error::{ProviderError, ProviderResult};
use super::http::{check_symbol, get_json};
use super::quote_provider::{ProviderStatus, QuoteProvider};
use crate::types::{PricePoint, PriceSource};

const PROVIDER: &str = "Polygon";
const BASE_URL: &str = "https://api.polygon.io";

pub struct PolygonClient {
    client: Client,
    base_url: String,
    api_key: String,
    status: RwLock<ProviderStatus>,
}

impl PolygonClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, BASE_URL)
    }

    pub fn with_base_url(client: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            status: RwLock::new(ProviderStatus::Healthy),
        }
    }

    async fn request_quote(&self, symbol: &str) -> ProviderResult<PricePoint> {
        let url = format!("{}/v2/aggs/ticker/{}/prev", self.base_url, symbol);
        let request = self
            .client
            .get(&url)
            .query(&[("adjusted", "true"), ("apikey", self.api_key.as_str())]);

        debug!("Fetching {} from Polygon", symbol);
        let body: AggregatesResponse = get_json(PROVIDER, request).await?;
        parse_previous_close(symbol, body)
    }
}

#[async_trait]
impl QuoteProvider for PolygonClient {
    fn provider_name(&self) -> &str {
        PROVIDER
    }

    fn status(&self) -> ProviderStatus {
        *self.status.read()
    }

    async fn fetch_quote(&self, symbol: &str) -> ProviderResult<PricePoint> {
        // Caller error, not a provider fault: status is left alone
        check_symbol(PROVIDER, symbol)?;
        let outcome = self.request_quote(symbol).await;
        *self.status.write() = ProviderStatus::from_outcome(&outcome);
        outcome
    }
}

fn parse_previous_close(symbol: &str, body: AggregatesResponse) -> ProviderResult<PricePoint> {
    let bar = body
        .results
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "empty results"))?;

    let close = bar
        .c
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "missing close"))?;
    let open = bar.o.unwrap_or(close);
    let volume = bar.v.map(|v| v.max(0.0) as u64).unwrap_or(0);

    Ok(PricePoint::from_reference(
        symbol,
        close,
        open,
        volume,
        PriceSource::Polygon,
    ))
}

#[derive(Debug, Deserialize)]
struct AggregatesResponse {
    results: Option<Vec<AggregateBar>>,
}

/// Single aggregate bar; Polygon uses one-letter field names
#[derive(Debug, Deserialize)]
struct AggregateBar {
    o: Option<f64>,
    c: Option<f64>,
    v: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_previous_close() {
        let body: AggregatesResponse = serde_json::from_value(json!({
            "ticker": "NVDA",
            "resultsCount": 1,
            "results": [{ "T": "NVDA", "o": 140.0, "h": 147.1, "l": 139.5, "c": 145.5, "v": 312000000.0 }]
        }))
        .unwrap();

        let point = parse_previous_close("NVDA", body).unwrap();
        assert_eq!(point.price, 145.5);
        assert_eq!(point.change, 5.5);
        assert_eq!(point.change_percent, 3.93);
        assert_eq!(point.volume, 312_000_000);
        assert_eq!(point.source, PriceSource::Polygon);
    }

    #[test]
    fn test_empty_results_is_malformed() {
        let body: AggregatesResponse =
            serde_json::from_value(json!({ "resultsCount": 0, "results": [] })).unwrap();
        assert!(matches!(
            parse_previous_close("ZZZZ", body),
            Err(ProviderError::Malformed { .. })
        ));

        let body: AggregatesResponse = serde_json::from_value(json!({ "status": "ERROR" })).unwrap();
        assert!(parse_previous_close("ZZZZ", body).is_err());
    }

    #[tokio::test]
    async fn test_path_symbol_rejected_before_request() {
        // Unreachable host: a request would surface as Transport instead
        let provider = PolygonClient::with_base_url(Client::new(), "demo", "http://127.0.0.1:9");

        for symbol in ["../x", "AAPL/prev", "A%2F"] {
            let result = provider.fetch_quote(symbol).await;
            assert!(matches!(result, Err(ProviderError::InvalidSymbol { .. })), "{}", symbol);
        }
        assert_eq!(provider.status(), ProviderStatus::Healthy);
    }
}
