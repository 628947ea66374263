//! Headless wallet backed by a local private key.
//!
//! Signs with a [`PrivateKeySigner`] and talks to a node over HTTP. Useful
//! for scripted runs and for driving the controller without a browser.

use alloy::network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, B256, Bytes};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::{ProviderError, UNSUPPORTED_METHOD, WalletError};
use crate::network::format_chain_id;
use crate::provider::{BlockTag, ContractCall, ProviderEvent, TxReceipt, WalletProvider};

const EVENT_CAPACITY: usize = 16;

pub struct LocalKeyProvider {
    provider: DynProvider,
    address: Address,
    events: broadcast::Sender<ProviderEvent>,
}

impl LocalKeyProvider {
    /// `private_key` is hex, with or without `0x`.
    pub fn new(rpc_url: &str, private_key: &str) -> Result<Self, WalletError> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| WalletError::InvalidValue(format!("private key: {e}")))?;
        let address = signer.address();

        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| WalletError::InvalidValue(format!("RPC URL {rpc_url}: {e}")))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            provider,
            address,
            events,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

fn provider_error(err: RpcError<TransportErrorKind>) -> ProviderError {
    match err {
        RpcError::ErrorResp(payload) => ProviderError::new(payload.code, payload.message),
        other => ProviderError::internal(other.to_string()),
    }
}

fn parse_address(raw: &str) -> Result<Address, ProviderError> {
    raw.parse()
        .map_err(|e| ProviderError::internal(format!("invalid address {raw}: {e}")))
}

fn to_request(call: ContractCall) -> Result<TransactionRequest, ProviderError> {
    let mut tx = TransactionRequest::default()
        .with_to(call.to)
        .with_input(call.data)
        .with_value(call.value);
    if let Some(from) = call.from.as_deref() {
        tx = tx.with_from(parse_address(from)?);
    }
    Ok(tx)
}

#[async_trait]
impl WalletProvider for LocalKeyProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec![format!("{:#x}", self.address)])
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        let id = self.provider.get_chain_id().await.map_err(provider_error)?;
        Ok(format_chain_id(id))
    }

    async fn get_balance(&self, address: &str, _block: BlockTag) -> Result<String, ProviderError> {
        let balance = self
            .provider
            .get_balance(parse_address(address)?)
            .await
            .map_err(provider_error)?;
        Ok(format!("{balance:#x}"))
    }

    async fn switch_chain(&self, chain_id: &str) -> Result<(), ProviderError> {
        Err(ProviderError::new(
            UNSUPPORTED_METHOD,
            format!("local key provider is bound to its RPC endpoint, cannot switch to {chain_id}"),
        ))
    }

    async fn send_transaction(&self, call: ContractCall) -> Result<String, ProviderError> {
        let pending = self
            .provider
            .send_transaction(to_request(call)?)
            .await
            .map_err(provider_error)?;
        Ok(format!("{:#x}", pending.tx_hash()))
    }

    async fn call(&self, call: ContractCall) -> Result<Bytes, ProviderError> {
        self.provider
            .call(to_request(call)?)
            .await
            .map_err(provider_error)
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, ProviderError> {
        let hash: B256 = tx_hash
            .parse()
            .map_err(|e| ProviderError::internal(format!("invalid tx hash {tx_hash}: {e}")))?;
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(provider_error)?;

        Ok(receipt.map(|r| TxReceipt {
            tx_hash: format!("{:#x}", r.transaction_hash()),
            block_number: r.block_number(),
            success: r.status(),
        }))
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
