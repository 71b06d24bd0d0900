//! `GET /health`: liveness plus the last observed status of each live provider

use axum::extract::State;
use axum::Json;
use copilot_core::clients::ProviderHealth;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub watch_list: usize,
    pub providers: Vec<ProviderHealth>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let aggregator = &state.aggregator;

    Json(HealthResponse {
        status: "healthy",
        uptime_secs: state.uptime_secs(),
        watch_list: aggregator.config().watch_list.len(),
        providers: aggregator.provider_statuses(),
    })
}
