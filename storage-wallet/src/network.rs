//! Known networks and the single supported deployment network.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    pub chain_id: u64,
    pub name: String,
    pub native_symbol: String,
    pub is_supported: bool,
}

impl NetworkDescriptor {
    pub fn new(chain_id: u64, name: &str, native_symbol: &str) -> Self {
        Self {
            chain_id,
            name: name.to_string(),
            native_symbol: native_symbol.to_string(),
            is_supported: false,
        }
    }

    /// Chain id in the provider's hex form, e.g. `0xa869`.
    pub fn hex_chain_id(&self) -> String {
        format_chain_id(self.chain_id)
    }
}

/// Parse a chain id as reported by a provider: `0x`-prefixed hex, or
/// decimal for providers that report numbers.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

pub fn format_chain_id(chain_id: u64) -> String {
    format!("{chain_id:#x}")
}

/// Canonical lowercase hex form; unparseable ids are kept lowercased.
pub fn normalize_chain_id(raw: &str) -> String {
    parse_chain_id(raw)
        .map(format_chain_id)
        .unwrap_or_else(|| raw.trim().to_ascii_lowercase())
}

/// Static lookup keyed by chain id. Exactly one entry is supported.
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    supported: NetworkDescriptor,
    known: HashMap<u64, NetworkDescriptor>,
}

impl NetworkRegistry {
    pub fn new(mut supported: NetworkDescriptor) -> Self {
        supported.is_supported = true;
        Self {
            supported,
            known: HashMap::new(),
        }
    }

    /// Register a recognized but unsupported network. Registering the
    /// supported chain id again is ignored.
    pub fn with_network(mut self, mut descriptor: NetworkDescriptor) -> Self {
        if descriptor.chain_id != self.supported.chain_id {
            descriptor.is_supported = false;
            self.known.insert(descriptor.chain_id, descriptor);
        }
        self
    }

    /// Avalanche Fuji as the deployment network.
    pub fn fuji() -> Self {
        Self::new(NetworkDescriptor::new(43113, "Avalanche Fuji Testnet", "AVAX"))
            .with_network(NetworkDescriptor::new(43114, "Avalanche C-Chain", "AVAX"))
            .with_network(NetworkDescriptor::new(1, "Ethereum Mainnet", "ETH"))
    }

    pub fn supported(&self) -> &NetworkDescriptor {
        &self.supported
    }

    pub fn lookup(&self, chain_id: &str) -> Option<&NetworkDescriptor> {
        let id = parse_chain_id(chain_id)?;
        if id == self.supported.chain_id {
            Some(&self.supported)
        } else {
            self.known.get(&id)
        }
    }

    /// Lookup miss or `is_supported == false` both mean unsupported.
    pub fn is_supported(&self, chain_id: &str) -> bool {
        self.lookup(chain_id).is_some_and(|n| n.is_supported)
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::fuji()
    }
}
