//! Configuration for the market service

use market_core::commission::DEFAULT_RATE_BPS;
use serde::{Deserialize, Serialize};

/// Market service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Metrics listen address
    pub metrics_listen_addr: String,

    /// Account that accrues the marketplace commission
    pub operator_account: String,

    /// Commission rate in basis points (500 = 5%)
    pub commission_rate_bps: u32,

    /// Actor mailbox capacity (bounded for backpressure)
    pub mailbox_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "market-service".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            metrics_listen_addr: "0.0.0.0:9090".to_string(),
            operator_account: "operator".to_string(),
            commission_rate_bps: DEFAULT_RATE_BPS,
            mailbox_capacity: 1000,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(operator) = std::env::var("MARKET_OPERATOR_ACCOUNT") {
            config.operator_account = operator;
        }

        if let Ok(addr) = std::env::var("MARKET_METRICS_ADDR") {
            config.metrics_listen_addr = addr;
        }

        if let Ok(rate) = std::env::var("MARKET_COMMISSION_BPS") {
            config.commission_rate_bps = rate.parse().map_err(|_| {
                crate::Error::Config(format!("Invalid MARKET_COMMISSION_BPS: {rate}"))
            })?;
        }

        Ok(config)
    }
}
