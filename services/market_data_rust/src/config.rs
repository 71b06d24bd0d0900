//! Service configuration

use anyhow::{anyhow, Result};
use copilot_core::AggregatorConfig;
use std::env;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub aggregator: AggregatorConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            aggregator: AggregatorConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            host: env::var("MARKET_DATA_HOST").unwrap_or(defaults.host),
            port: parse_u16("MARKET_DATA_PORT", defaults.port)?,
            aggregator: AggregatorConfig::from_env()?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse environment variable as u16 with default fallback
fn parse_u16(var_name: &str, default: u16) -> Result<u16> {
    match env::var(var_name) {
        Ok(val) => val
            .parse()
            .map_err(|_| anyhow!("{} must be a valid port number", var_name)),
        Err(_) => Ok(default),
    }
}
