//! Wire-level market data types shared by the aggregator, the provider
//! clients and the HTTP service.
//!
//! Field names serialize in camelCase and timestamps as epoch milliseconds so
//! the dashboard can consume them without translation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::money::{percent_change, round_to_cents};

/// Which upstream produced a quote
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    AlphaVantage,
    Polygon,
    Yahoo,
    /// Synthetic fallback, never a live quote
    #[serde(rename = "mock")]
    Synthetic,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::AlphaVantage => "alpha_vantage",
            PriceSource::Polygon => "polygon",
            PriceSource::Yahoo => "yahoo",
            PriceSource::Synthetic => "mock",
        }
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized quote for one symbol at one instant
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub symbol: String,
    pub price: f64,
    /// `price - reference`
    pub change: f64,
    /// `change / reference * 100`
    pub change_percent: f64,
    pub volume: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub source: PriceSource,
}

impl PricePoint {
    /// Build a point from a price and the reference it moved from.
    ///
    /// Price is rounded to cents first and `change` is taken from the rounded
    /// price, then `change_percent` from the rounded `change`, so the emitted
    /// fields satisfy `change_percent == round2(change / reference * 100)`.
    pub fn from_reference(
        symbol: impl Into<String>,
        price: f64,
        reference: f64,
        volume: u64,
        source: PriceSource,
    ) -> Self {
        let price = round_to_cents(price);
        let change = round_to_cents(price - reference);
        Self {
            symbol: symbol.into(),
            price,
            change,
            change_percent: round_to_cents(percent_change(change, reference)),
            volume,
            timestamp: Utc::now(),
            source,
        }
    }
}

/// Whether `symbol` is safe to hand to an upstream API: 1 to 16 ASCII
/// letters, digits, `.`, `^` or `-`.
pub fn is_valid_symbol(symbol: &str) -> bool {
    (1..=16).contains(&symbol.len())
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '-'))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// A classified market headline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub relevant_symbols: Vec<String>,
    pub sentiment: Sentiment,
    pub impact: Impact,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorStatus {
    High,
    Low,
    Neutral,
}

/// Snapshot of one tracked macro indicator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicIndicator {
    pub name: String,
    pub value: f64,
    pub change: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub status: IndicatorStatus,
}
