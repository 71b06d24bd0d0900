//! Axum application builder.
//!
//! Routes:
//! - `GET /market-data?symbol=T` - quote through the provider chain
//! - `GET /prices/{symbol}` - cached quote or 404
//! - `GET /news`, `GET /indicators`, `GET /indices`
//! - `GET /stream/{symbol}` - SSE price stream
//! - `GET /health`

use axum::routing::get;
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{health, market, stream};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    // Dashboard is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health::health))
        .route("/market-data", get(market::market_data))
        .route("/prices/{symbol}", get(market::cached_price))
        .route("/news", get(market::news))
        .route("/indicators", get(market::indicators))
        .route("/indices", get(market::indices))
        .route("/stream/{symbol}", get(stream::stream_prices))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
