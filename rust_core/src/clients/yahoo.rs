//! Yahoo Finance chart endpoint
//!
//! Unauthenticated, scrape-style. Always present in the chain; requests carry a
//! browser User-Agent because the endpoint rejects obvious bots.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::error::{ProviderError, ProviderResult};
use super::http::{check_symbol, get_json};
use super::quote_provider::{ProviderStatus, QuoteProvider};
use crate::types::{PricePoint, PriceSource};

const PROVIDER: &str = "Yahoo";
const BASE_URL: &str = "https://query1.finance.yahoo.com";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub struct YahooChartClient {
    client: Client,
    base_url: String,
    status: RwLock<ProviderStatus>,
}

impl YahooChartClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            status: RwLock::new(ProviderStatus::Healthy),
        }
    }

    async fn request_quote(&self, symbol: &str) -> ProviderResult<PricePoint> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let request = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .query(&[("interval", "1m"), ("range", "1d")]);

        debug!("Fetching {} from Yahoo chart endpoint", symbol);
        let body: ChartResponse = get_json(PROVIDER, request).await?;
        parse_chart(symbol, body)
    }
}

#[async_trait]
impl QuoteProvider for YahooChartClient {
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

fn parse_chart(symbol: &str, body: ChartResponse) -> ProviderResult<PricePoint> {
    let meta = body
        .chart
        .and_then(|c| c.result)
        .and_then(|results| results.into_iter().next())
        .and_then(|r| r.meta)
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "missing chart meta"))?;

    let previous_close = meta
        .previous_close
        .or(meta.chart_previous_close)
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "missing previousClose"))?;
    let price = meta.regular_market_price.unwrap_or(previous_close);
    let volume = meta.regular_market_volume.unwrap_or(0);

    Ok(PricePoint::from_reference(
        symbol,
        price,
        previous_close,
        volume,
        PriceSource::Yahoo,
    ))
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Option<Chart>,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    regular_market_volume: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_chart_meta() {
        let body: ChartResponse = serde_json::from_value(json!({
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "MSFT",
                        "regularMarketPrice": 450.0,
                        "previousClose": 445.2,
                        "regularMarketVolume": 21000000
                    },
                    "timestamp": []
                }],
                "error": null
            }
        }))
        .unwrap();

        let point = parse_chart("MSFT", body).unwrap();
        assert_eq!(point.price, 450.0);
        assert_eq!(point.change, 4.8);
        assert_eq!(point.change_percent, 1.08);
        assert_eq!(point.volume, 21_000_000);
        assert_eq!(point.source, PriceSource::Yahoo);
    }

    #[test]
    fn test_missing_market_price_uses_previous_close() {
        let body: ChartResponse = serde_json::from_value(json!({
            "chart": { "result": [{ "meta": { "previousClose": 100.0 } }] }
        }))
        .unwrap();

        let point = parse_chart("ZZZZ", body).unwrap();
        assert_eq!(point.price, 100.0);
        assert_eq!(point.change, 0.0);
        assert_eq!(point.volume, 0);
    }

    #[test]
    fn test_error_payload_is_malformed() {
        let body: ChartResponse = serde_json::from_value(json!({
            "chart": { "result": null, "error": { "code": "Not Found" } }
        }))
        .unwrap();
        assert!(matches!(parse_chart("ZZZZ", body), Err(ProviderError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_path_symbol_rejected_before_request() {
        let provider = YahooChartClient::with_base_url(Client::new(), "http://127.0.0.1:9");

        let result = provider.fetch_quote("../../v7/finance/quote").await;
        assert!(matches!(result, Err(ProviderError::InvalidSymbol { .. })));

        let result = provider.fetch_quote("^GSPC").await;
        assert!(matches!(result, Err(ProviderError::Transport { .. })));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_chart() {
        let provider = YahooChartClient::new(Client::new());
        let point = provider.fetch_quote("SPY").await.unwrap();
        assert!(point.price > 0.0);
        assert_eq!(point.source, PriceSource::Yahoo);
    }
}
