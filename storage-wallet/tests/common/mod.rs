//! Scripted in-memory wallet provider.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Bytes, U256};
use async_trait::async_trait;
use tokio::sync::{Notify, broadcast};

use storage_wallet::{
    BlockTag, ContractCall, ProviderError, ProviderEvent, TxReceipt, WalletProvider,
};

pub const ACCOUNT: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const OTHER_ACCOUNT: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
pub const FUJI: &str = "0xa869";
pub const MAINNET: &str = "0x1";
/// 10^18 in the smallest unit.
pub const ONE_AVAX: &str = "0xde0b6b3a7640000";
pub const TX_HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

pub struct MockWallet {
    pub accounts: Mutex<Result<Vec<String>, ProviderError>>,
    pub chain: Mutex<String>,
    pub balance: Mutex<Result<String, ProviderError>>,
    pub send_result: Mutex<Result<String, ProviderError>>,
    pub switch_result: Mutex<Result<(), ProviderError>>,
    pub stored_value: Mutex<U256>,
    pub receipts: Mutex<VecDeque<Option<TxReceipt>>>,
    /// When set, balance requests park until the gate is notified.
    pub balance_gate: Mutex<Option<Arc<Notify>>>,
    pub balance_started: Notify,
    /// One-shot: the next chain id request answers, then parks until
    /// notified before returning that answer.
    pub chain_gate: Mutex<Option<Arc<Notify>>>,
    pub chain_started: Notify,
    pub balance_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub switch_calls: AtomicUsize,
    pub sent: Mutex<Vec<ContractCall>>,
    events: Mutex<Option<broadcast::Sender<ProviderEvent>>>,
}

impl MockWallet {
    pub fn new() -> Arc<Self> {
        let (tx, _) = broadcast::channel(16);
        Arc::new(Self {
            accounts: Mutex::new(Ok(vec![ACCOUNT.to_string()])),
            chain: Mutex::new(FUJI.to_string()),
            balance: Mutex::new(Ok(ONE_AVAX.to_string())),
            send_result: Mutex::new(Ok(TX_HASH.to_string())),
            switch_result: Mutex::new(Ok(())),
            stored_value: Mutex::new(U256::from(42u64)),
            receipts: Mutex::new(VecDeque::new()),
            balance_gate: Mutex::new(None),
            balance_started: Notify::new(),
            chain_gate: Mutex::new(None),
            chain_started: Notify::new(),
            balance_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            switch_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            events: Mutex::new(Some(tx)),
        })
    }

    pub fn set_accounts(&self, result: Result<Vec<String>, ProviderError>) {
        *self.accounts.lock().unwrap() = result;
    }

    pub fn set_chain(&self, chain: &str) {
        *self.chain.lock().unwrap() = chain.to_string();
    }

    pub fn set_balance(&self, result: Result<String, ProviderError>) {
        *self.balance.lock().unwrap() = result;
    }

    pub fn set_send_result(&self, result: Result<String, ProviderError>) {
        *self.send_result.lock().unwrap() = result;
    }

    pub fn push_receipt(&self, receipt: Option<TxReceipt>) {
        self.receipts.lock().unwrap().push_back(receipt);
    }

    /// Park subsequent balance requests until the returned gate is notified.
    pub fn gate_balance(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.balance_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Park the next chain id request after it has read the current chain.
    pub fn gate_chain_id(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.chain_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn emit(&self, event: ProviderEvent) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }

    pub fn close_events(&self) {
        self.events.lock().unwrap().take();
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }
}

pub fn receipt(success: bool) -> TxReceipt {
    TxReceipt {
        tx_hash: TX_HASH.to_string(),
        block_number: Some(1_000_001),
        success,
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.accounts.lock().unwrap().clone()
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        let chain = self.chain.lock().unwrap().clone();
        let gate = self.chain_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            self.chain_started.notify_one();
            gate.notified().await;
        }
        Ok(chain)
    }

    async fn get_balance(&self, _address: &str, block: BlockTag) -> Result<String, ProviderError> {
        assert_eq!(block, BlockTag::Latest);
        self.balance_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.balance_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            self.balance_started.notify_one();
            gate.notified().await;
        }
        self.balance.lock().unwrap().clone()
    }

    async fn switch_chain(&self, chain_id: &str) -> Result<(), ProviderError> {
        self.switch_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.switch_result.lock().unwrap().clone();
        if result.is_ok() {
            self.set_chain(chain_id);
            self.emit(ProviderEvent::ChainChanged(chain_id.to_string()));
        }
        result
    }

    async fn send_transaction(&self, call: ContractCall) -> Result<String, ProviderError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(call);
        self.send_result.lock().unwrap().clone()
    }

    async fn call(&self, _call: ContractCall) -> Result<Bytes, ProviderError> {
        let value = *self.stored_value.lock().unwrap();
        Ok(Bytes::from(value.to_be_bytes::<32>().to_vec()))
    }

    async fn transaction_receipt(&self, _tx_hash: &str) -> Result<Option<TxReceipt>, ProviderError> {
        Ok(self.receipts.lock().unwrap().pop_front().flatten())
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        match self.events.lock().unwrap().as_ref() {
            Some(tx) => tx.subscribe(),
            None => broadcast::channel(1).1,
        }
    }
}
