//! The wallet-provider boundary consumed by the connection controller.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use storage_runtime::contracts::ISimpleStorage;

use crate::error::ProviderError;

/// Block tag passed to balance queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockTag {
    #[default]
    Latest,
}

impl BlockTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockTag::Latest => "latest",
        }
    }
}

/// Events pushed by the provider outside of any request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(String),
}

/// A contract call in `eth_sendTransaction` / `eth_call` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl ContractCall {
    /// `getValue()` read.
    pub fn get_value(contract: Address) -> Self {
        Self {
            from: None,
            to: contract,
            data: ISimpleStorage::getValueCall {}.abi_encode().into(),
            value: U256::ZERO,
        }
    }

    /// `setValue(uint256)` write sent from `from`.
    pub fn set_value(contract: Address, from: Option<String>, new_value: U256) -> Self {
        Self {
            from,
            to: contract,
            data: ISimpleStorage::setValueCall { _value: new_value }
                .abi_encode()
                .into(),
            value: U256::ZERO,
        }
    }
}

/// Minimal view of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// An injected wallet: account access, chain info, transactions and a
/// stream of pushed events.
///
/// Rejections are reported as [`ProviderError`] with the provider's numeric
/// code (`4001` user rejection, `-32002` request pending).
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Hex-encoded chain identifier, e.g. `0xa869`.
    async fn chain_id(&self) -> Result<String, ProviderError>;

    /// Native balance in the smallest unit, hex-encoded.
    async fn get_balance(&self, address: &str, block: BlockTag) -> Result<String, ProviderError>;

    async fn switch_chain(&self, chain_id: &str) -> Result<(), ProviderError>;

    /// Submit a transaction, returning its hash once accepted.
    async fn send_transaction(&self, call: ContractCall) -> Result<String, ProviderError>;

    /// Execute a read-only call, returning the raw return data.
    async fn call(&self, call: ContractCall) -> Result<Bytes, ProviderError>;

    /// `None` while the transaction is not yet included.
    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, ProviderError>;

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}
