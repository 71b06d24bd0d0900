//! Provider error taxonomy.
//!
//! None of these reach aggregator consumers: the chained provider logs them and
//! moves to the next stage, ending at the synthetic generator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Symbol rejected before it reached the URL
    #[error("{provider}: invalid symbol {symbol:?}")]
    InvalidSymbol {
        provider: &'static str,
        symbol: String,
    },

    /// Network failure or timeout
    #[error("{provider}: request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered 429
    #[error("{provider}: rate limited")]
    RateLimited { provider: &'static str },

    /// Any other non-2xx response
    #[error("{provider}: HTTP {status} - {body}")]
    Http {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Response parsed but lacks the fields a quote needs
    #[error("{provider}: malformed payload: {reason}")]
    Malformed {
        provider: &'static str,
        reason: String,
    },
}

impl ProviderError {
    pub fn malformed(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            provider,
            reason: reason.into(),
        }
    }

    /// Transient errors are worth retrying on the next scheduled tick
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Transport { .. }
                | ProviderError::RateLimited { .. }
                | ProviderError::Http { .. }
        )
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
