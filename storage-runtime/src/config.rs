//! Deployment configuration for the query service.
//!
//! Defaults target the SimpleStorage deployment on Avalanche Fuji. Each
//! value can be overridden from the environment:
//!
//! - `RPC_URL`: JSON-RPC endpoint
//! - `CONTRACT_ADDRESS`: SimpleStorage contract address
//! - `RPC_TIMEOUT_MS`: per-call RPC timeout in milliseconds
//! - `PORT`: HTTP listen port

use std::time::Duration;

use alloy::primitives::{Address, address};

use crate::error::QueryError;

pub const DEFAULT_RPC_URL: &str = "https://api.avax-test.network/ext/bc/C/rpc";
pub const DEFAULT_CONTRACT: Address = address!("8b427e7f1291dc686bd32315afafe44be50fefce");
pub const FUJI_CHAIN_ID: u64 = 43113;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest `toBlock - fromBlock` span accepted by an event query.
pub const MAX_BLOCK_RANGE: u64 = 2048;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub rpc_url: String,
    pub contract_address: Address,
    pub chain_id: u64,
    pub rpc_timeout: Duration,
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: DEFAULT_CONTRACT,
            chain_id: FUJI_CHAIN_ID,
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
            port: DEFAULT_PORT,
        }
    }
}

impl ServiceConfig {
    /// Build a config from defaults overridden by environment variables.
    pub fn from_env() -> Result<Self, QueryError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServiceConfig::from_env`] but reading from an arbitrary
    /// key lookup, so tests do not have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, QueryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("RPC_URL") {
            url.parse::<url::Url>()?;
            config.rpc_url = url;
        }

        if let Some(addr) = lookup("CONTRACT_ADDRESS") {
            config.contract_address = addr.parse().map_err(|e| {
                QueryError::ConfigError(format!("Invalid CONTRACT_ADDRESS '{addr}': {e}"))
            })?;
        }

        if let Some(ms) = lookup("RPC_TIMEOUT_MS") {
            let ms: u64 = ms
                .parse()
                .map_err(|e| QueryError::ConfigError(format!("Invalid RPC_TIMEOUT_MS: {e}")))?;
            config.rpc_timeout = Duration::from_millis(ms);
        }

        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .map_err(|e| QueryError::ConfigError(format!("Invalid PORT: {e}")))?;
        }

        Ok(config)
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }
}
