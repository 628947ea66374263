//! Read-only chain access for the query service.
//!
//! [`ChainReader`] is the seam between the service and the JSON-RPC
//! endpoint. [`RpcChainReader`] implements it over an alloy HTTP provider,
//! bounding every call with a timeout and describing failures in the
//! vocabulary understood by [`crate::classify`].

use std::future::Future;
use std::time::Duration;

use alloy::network::Ethereum;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;

use crate::config::ServiceConfig;
use crate::contracts::ISimpleStorage;
use crate::error::{QueryError, TransportFailure};

/// A decoded `ValueUpdated` log entry.
///
/// Position fields are optional because nodes omit them for pending logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueUpdatedLog {
    pub block_number: Option<u64>,
    pub value: U256,
    pub tx_hash: Option<B256>,
    pub log_index: Option<u64>,
}

#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Current value of the contract's storage slot.
    async fn stored_value(&self) -> Result<U256, TransportFailure>;

    /// Latest block height known to the node.
    async fn block_number(&self) -> Result<u64, TransportFailure>;

    /// `ValueUpdated` logs over the inclusive range, in node order.
    async fn value_updated_logs(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ValueUpdatedLog>, TransportFailure>;
}

/// [`ChainReader`] backed by an alloy HTTP provider.
#[derive(Debug, Clone)]
pub struct RpcChainReader {
    provider: RootProvider<Ethereum>,
    contract_address: Address,
    timeout: Duration,
}

impl RpcChainReader {
    pub fn new(
        rpc_url: &str,
        contract_address: Address,
        timeout: Duration,
    ) -> Result<Self, QueryError> {
        let url: url::Url = rpc_url.parse()?;
        let provider = RootProvider::<Ethereum>::new_http(url);

        Ok(Self {
            provider,
            contract_address,
            timeout,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, QueryError> {
        Self::new(&config.rpc_url, config.contract_address, config.rpc_timeout)
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T, TransportFailure>
    where
        F: Future<Output = Result<T, TransportFailure>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(TransportFailure::new(format!(
                "{op}: request timeout after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn stored_value(&self) -> Result<U256, TransportFailure> {
        // Each call works on its own provider handle, dropped on return.
        let contract = ISimpleStorage::new(self.contract_address, self.provider.clone());
        self.bounded("eth_call getValue", async move {
            contract
                .getValue()
                .call()
                .await
                .map_err(describe_contract_error)
        })
        .await
    }

    async fn block_number(&self) -> Result<u64, TransportFailure> {
        let provider = self.provider.clone();
        self.bounded("eth_blockNumber", async move {
            provider
                .get_block_number()
                .await
                .map_err(|e| TransportFailure::new(describe_transport_error(&e)))
        })
        .await
    }

    async fn value_updated_logs(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ValueUpdatedLog>, TransportFailure> {
        let provider = self.provider.clone();
        let filter = Filter::new()
            .address(self.contract_address)
            .event_signature(ISimpleStorage::ValueUpdated::SIGNATURE_HASH)
            .from_block(from_block)
            .to_block(to_block);

        let logs = self
            .bounded("eth_getLogs", async move {
                provider
                    .get_logs(&filter)
                    .await
                    .map_err(|e| TransportFailure::new(describe_transport_error(&e)))
            })
            .await?;

        logs.iter().map(decode_value_updated).collect()
    }
}

fn decode_value_updated(log: &Log) -> Result<ValueUpdatedLog, TransportFailure> {
    let decoded = log
        .log_decode::<ISimpleStorage::ValueUpdated>()
        .map_err(|e| TransportFailure::new(format!("undecodable ValueUpdated log: {e}")))?;

    Ok(ValueUpdatedLog {
        block_number: log.block_number,
        value: decoded.inner.data.newValue,
        tx_hash: log.transaction_hash,
        log_index: log.log_index,
    })
}

/// Describe an RPC error so connection-level problems carry the
/// unreachability markers and everything else keeps the node's own text.
fn describe_transport_error(err: &RpcError<TransportErrorKind>) -> String {
    match err {
        RpcError::Transport(TransportErrorKind::HttpError(http)) => {
            format!("fetch failed with HTTP status {}", http.status)
        }
        RpcError::Transport(TransportErrorKind::BackendGone) => {
            "network backend connection closed".to_string()
        }
        RpcError::Transport(TransportErrorKind::Custom(inner)) => {
            format!("network request failed: {inner}")
        }
        other => other.to_string(),
    }
}

fn describe_contract_error(err: alloy::contract::Error) -> TransportFailure {
    match err {
        alloy::contract::Error::TransportError(e) => {
            TransportFailure::new(describe_transport_error(&e))
        }
        other => TransportFailure::new(other.to_string()),
    }
}
