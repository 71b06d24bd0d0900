//! Alpha Vantage API Client
//!
//! Keyed GLOBAL_QUOTE endpoint. First stage of the quote chain when
//! `ALPHA_VANTAGE_KEY` is configured.
//!
//! Rate limits on the free tier are tight (a handful of requests per minute);
//! throttled responses come back as HTTP 200 with a `Note`/`Information` body.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::error::{ProviderError, ProviderResult};
use super::http::{check_symbol, get_json};
use super::quote_provider::{ProviderStatus, QuoteProvider};
use crate::types::{PricePoint, PriceSource};

const PROVIDER: &str = "AlphaVantage";
const BASE_URL: &str = "https://www.alphavantage.co";

pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
    status: RwLock<ProviderStatus>,
}

impl AlphaVantageClient {
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
        let url = format!("{}/query", self.base_url);
        let request = self.client.get(&url).query(&[
            ("function", "GLOBAL_QUOTE"),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ]);

        debug!("Fetching {} from Alpha Vantage", symbol);
        let body: GlobalQuoteResponse = get_json(PROVIDER, request).await?;
        parse_global_quote(symbol, body)
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageClient {
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

/// Normalize a GLOBAL_QUOTE body into a price point
fn parse_global_quote(symbol: &str, body: GlobalQuoteResponse) -> ProviderResult<PricePoint> {
    if body.note.is_some() || body.information.is_some() {
        return Err(ProviderError::RateLimited { provider: PROVIDER });
    }

    let quote = body
        .global_quote
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "missing Global Quote"))?;

    let price = parse_number(quote.price.as_deref())
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "missing 05. price"))?;
    // Prefer the stated previous close; otherwise back it out of the change
    let reference = parse_number(quote.previous_close.as_deref())
        .or_else(|| parse_number(quote.change.as_deref()).map(|change| price - change))
        .unwrap_or(price);
    let volume = quote
        .volume
        .as_deref()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);

    Ok(PricePoint::from_reference(
        symbol,
        price,
        reference,
        volume,
        PriceSource::AlphaVantage,
    ))
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
}
