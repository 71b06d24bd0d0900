//! Quote proxy and cached query endpoints.
//!
//! - `GET /market-data?symbol=T` - one quote through the provider chain
//! - `GET /prices/{symbol}` - last cached quote
//! - `GET /news` - news cache
//! - `GET /indicators` - economic indicator table
//! - `GET /indices` - SPY, QQQ, VIX

use axum::extract::{Path, Query, State};
use axum::Json;
use copilot_core::{EconomicIndicator, NewsItem, PricePoint};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SymbolQuery {
    pub symbol: Option<String>,
}

/// Stateless proxy: never touches the cache or the fetch cooldown
pub async fn market_data(
    State(state): State<AppState>,
    Query(query): Query<SymbolQuery>,
) -> AppResult<Json<PricePoint>> {
    let symbol = query
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Symbol is required".into()))?;

    debug!("Proxy quote for {}", symbol);
    Ok(Json(state.aggregator.quote(symbol).await))
}

pub async fn cached_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> AppResult<Json<PricePoint>> {
    state
        .aggregator
        .get_current_price(&symbol)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No cached price for {}", symbol)))
}

pub async fn news(State(state): State<AppState>) -> Json<Vec<NewsItem>> {
    Json(state.aggregator.get_market_news())
}

pub async fn indicators(State(state): State<AppState>) -> Json<Vec<EconomicIndicator>> {
    Json(state.aggregator.get_economic_indicators())
}

pub async fn indices(State(state): State<AppState>) -> Json<Vec<PricePoint>> {
    Json(state.aggregator.get_market_indices())
}
