//! Quote Provider Trait
//!
//! Common interface for equity quote sources. Implementations include
//! Alpha Vantage, Polygon and the Yahoo chart endpoint; each normalizes its own
//! response schema into a [`PricePoint`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::{ProviderError, ProviderResult};
use crate::types::PricePoint;

/// Provider health/availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Last request succeeded (or none made yet)
    #[default]
    Healthy,
    /// Last request was answered with 429
    RateLimited,
    /// Last request failed for any other reason
    Error,
}

impl ProviderStatus {
    /// Status implied by the outcome of a request
    pub fn from_outcome<T>(outcome: &ProviderResult<T>) -> Self {
        match outcome {
            Ok(_) => ProviderStatus::Healthy,
            Err(ProviderError::RateLimited { .. }) => ProviderStatus::RateLimited,
            Err(_) => ProviderStatus::Error,
        }
    }
}

/// Common trait for live quote providers
///
/// Implementations must be Send + Sync so the chain can be shared between the
/// polling task and HTTP handlers.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Display name used in logs and health output
    fn provider_name(&self) -> &str;

    /// Status observed on the most recent request
    fn status(&self) -> ProviderStatus;

    /// Fetch the current quote for `symbol`
    ///
    /// # Returns
    /// * `Ok(PricePoint)` - A structurally valid quote
    /// * `Err` - Network, HTTP or payload error
    async fn fetch_quote(&self, symbol: &str) -> ProviderResult<PricePoint>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_status_default() {
        assert_eq!(ProviderStatus::default(), ProviderStatus::Healthy);
    }

    #[test]
    fn test_status_from_outcome() {
        let ok: ProviderResult<()> = Ok(());
        assert_eq!(ProviderStatus::from_outcome(&ok), ProviderStatus::Healthy);

        let limited: ProviderResult<()> = Err(ProviderError::RateLimited { provider: "Polygon" });
        assert_eq!(ProviderStatus::from_outcome(&limited), ProviderStatus::RateLimited);

        let bad: ProviderResult<()> = Err(ProviderError::malformed("Yahoo", "no meta"));
        assert_eq!(ProviderStatus::from_outcome(&bad), ProviderStatus::Error);
    }
}
