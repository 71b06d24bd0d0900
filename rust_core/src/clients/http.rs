//! Shared HTTP plumbing for the provider clients.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::error::{ProviderError, ProviderResult};
use crate::types::is_valid_symbol;

const USER_AGENT: &str = "QuantCopilot/1.0";

/// Build the client shared by every provider in a chain
pub fn build_http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Reject symbols that could rewrite the upstream path or query
pub(crate) fn check_symbol(provider: &'static str, symbol: &str) -> ProviderResult<()> {
    if is_valid_symbol(symbol) {
        Ok(())
    } else {
        Err(ProviderError::InvalidSymbol {
            provider,
            symbol: symbol.to_string(),
        })
    }
}

/// Send `request` and decode a JSON body, mapping every failure onto the
/// provider error taxonomy.
pub(crate) async fn get_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
) -> ProviderResult<T> {
    let response = request
        .send()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited { provider });
        }
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Http {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    debug!("{} responded with {} bytes", provider, bytes.len());

    serde_json::from_slice(&bytes).map_err(|e| ProviderError::malformed(provider, e.to_string()))
}
