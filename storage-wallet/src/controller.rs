//! Wallet connection state machine.
//!
//! `ConnectionController` reconciles user intents (connect, switch network,
//! submit a value) and provider-pushed events (account and chain changes)
//! into a single [`ConnectionState`]. Handlers may interleave at every
//! provider round-trip; state is never held across an await, and balance
//! writes are re-validated against the current epoch and network before
//! they land.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use alloy::sol_types::SolCall;
use tokio::sync::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use storage_runtime::config::DEFAULT_CONTRACT;
use storage_runtime::contracts::ISimpleStorage;

use crate::error::{ProviderError, WalletError};
use crate::network::{NetworkRegistry, normalize_chain_id, parse_chain_id};
use crate::notice::{DEFAULT_NOTICE_TTL, NoticeKind, Notifier};
use crate::provider::{BlockTag, ContractCall, ProviderEvent, TxReceipt, WalletProvider};
use crate::state::ConnectionState;
use crate::units::{format_native_balance, parse_unsigned, shorten_address, truncate_message};
use crate::view::ConnectionView;

/// Longest provider diagnostic echoed back in a failure notice.
const MAX_DIAGNOSTIC_CHARS: usize = 80;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub contract_address: Address,
    pub notice_ttl: Duration,
    /// Pause between confirmation and the value re-read, letting the node
    /// settle.
    pub settle_delay: Duration,
    pub receipt_poll_interval: Duration,
    pub confirmation_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT,
            notice_ttl: DEFAULT_NOTICE_TTL,
            settle_delay: Duration::from_secs(1),
            receipt_poll_interval: Duration::from_secs(2),
            confirmation_timeout: Duration::from_secs(300),
        }
    }
}

/// Outcome of a network validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Supported,
    Unsupported,
}

#[derive(Clone)]
pub struct ConnectionController {
    provider: Option<Arc<dyn WalletProvider>>,
    networks: Arc<NetworkRegistry>,
    state: Arc<RwLock<ConnectionState>>,
    notifier: Notifier,
    config: Arc<ControllerConfig>,
}

impl ConnectionController {
    /// `provider` is `None` when no wallet is injected.
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        networks: NetworkRegistry,
        config: ControllerConfig,
    ) -> Self {
        Self {
            provider,
            networks: Arc::new(networks),
            state: Arc::new(RwLock::new(ConnectionState::default())),
            notifier: Notifier::new(config.notice_ttl),
            config: Arc::new(config),
        }
    }

    pub fn with_provider(provider: Arc<dyn WalletProvider>) -> Self {
        Self::new(
            Some(provider),
            NetworkRegistry::default(),
            ControllerConfig::default(),
        )
    }

    pub fn notices(&self) -> &Notifier {
        &self.notifier
    }

    pub fn networks(&self) -> &NetworkRegistry {
        &self.networks
    }

    pub async fn snapshot(&self) -> ConnectionState {
        self.state.read().await.clone()
    }

    pub async fn view(&self) -> ConnectionView {
        ConnectionView::new(&*self.state.read().await, &self.networks)
    }

    fn provider(&self) -> Result<Arc<dyn WalletProvider>, WalletError> {
        self.provider.clone().ok_or(WalletError::ProviderMissing)
    }

    fn fail(&self, err: WalletError, message: impl Into<String>) -> WalletError {
        self.notifier.show(NoticeKind::Error, message);
        err
    }

    /// Request account access and move to `Connected`.
    ///
    /// On any failure the state is left `Disconnected`.
    pub async fn connect(&self) -> Result<(), WalletError> {
        let provider = match self.provider() {
            Ok(p) => p,
            Err(e) => {
                let message = e.to_string();
                return Err(self.fail(e, message));
            }
        };

        {
            let mut state = self.state.write().await;
            if state.connecting {
                drop(state);
                return Err(self.fail(
                    WalletError::RequestPending,
                    "Connection request pending. Please check your wallet.",
                ));
            }
            state.connecting = true;
        }
        self.notifier.dismiss();

        let outcome = match provider.request_accounts().await {
            Ok(accounts) => accounts
                .first()
                .map(|a| normalize_address(a))
                .ok_or(WalletError::NoAccounts),
            Err(e) if e.is_user_rejection() => Err(WalletError::UserRejected),
            Err(e) if e.is_request_pending() => Err(WalletError::RequestPending),
            Err(e) => Err(WalletError::Provider(e)),
        };

        let address = match outcome {
            Ok(address) => address,
            Err(err) => {
                self.state.write().await.reset();
                tracing::warn!(error = %err, "wallet connection failed");
                let message = match &err {
                    WalletError::UserRejected => "Connection rejected by user".to_string(),
                    WalletError::RequestPending => {
                        "Connection request pending. Please check your wallet.".to_string()
                    }
                    WalletError::Provider(e) => format!("Connection failed: {}", e.message),
                    other => other.to_string(),
                };
                return Err(self.fail(err, message));
            }
        };

        {
            let mut state = self.state.write().await;
            state.connecting = false;
            state.connected = true;
            state.address = Some(address.clone());
            state.balance = None;
            state.bump_epoch();
        }
        tracing::info!(%address, "wallet connected");

        if let Err(e) = self.validate_network().await {
            tracing::warn!(error = %e, "network validation after connect failed");
        }
        Ok(())
    }

    /// Local reset; the wallet keeps its own permission grant.
    pub async fn disconnect(&self) {
        self.state.write().await.reset();
        tracing::info!("wallet disconnected locally");
    }

    /// Read the provider's chain and reconcile network validity.
    ///
    /// On the supported network this clears any standing network warning
    /// and refreshes the balance; otherwise the balance is dropped and a
    /// warning is shown.
    ///
    /// A chain id read that is overtaken by a newer connection, account or
    /// chain change is discarded and the current state's status returned.
    pub async fn validate_network(&self) -> Result<NetworkStatus, WalletError> {
        let provider = self.provider()?;
        let epoch = self.state.read().await.epoch;
        let raw = match provider.chain_id().await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read chain id");
                return Err(self.fail(e.into(), "Failed to validate network"));
            }
        };

        let chain_id = normalize_chain_id(&raw);
        let supported = self.networks.is_supported(&chain_id);

        let has_account = {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                tracing::debug!(%chain_id, "discarding stale chain id");
                return Ok(if state.network_valid {
                    NetworkStatus::Supported
                } else {
                    NetworkStatus::Unsupported
                });
            }
            if state.chain_id.as_deref() != Some(chain_id.as_str()) {
                state.chain_id = Some(chain_id.clone());
                state.balance = None;
                state.bump_epoch();
            }
            state.network_valid = supported;
            if !supported {
                state.balance = None;
            }
            state.connected && state.address.is_some()
        };

        if !supported {
            tracing::warn!(%chain_id, "unsupported network");
            self.notifier.show(
                NoticeKind::Warning,
                format!("Please switch to {}", self.networks.supported().name),
            );
            return Ok(NetworkStatus::Unsupported);
        }

        self.notifier.dismiss_kind(NoticeKind::Warning);
        if has_account {
            // Failures already surfaced as a notice; the last balance stays.
            if let Err(e) = self.refresh_balance().await {
                tracing::debug!(error = %e, "balance refresh skipped");
            }
        }
        Ok(NetworkStatus::Supported)
    }

    /// Fetch and store the native balance of the current account.
    ///
    /// Returns `Ok(None)` when the result was discarded because the account,
    /// chain or connection changed while the request was in flight.
    pub async fn refresh_balance(&self) -> Result<Option<String>, WalletError> {
        let provider = self.provider()?;
        let (address, epoch) = {
            let state = self.state.read().await;
            match (&state.address, state.connected) {
                (Some(address), true) => (address.clone(), state.epoch),
                _ => return Err(WalletError::NotConnected),
            }
        };

        let raw = match provider.get_balance(&address, BlockTag::Latest).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, %address, "failed to fetch balance");
                return Err(self.fail(e.into(), "Failed to fetch balance"));
            }
        };
        let formatted = match format_native_balance(&raw) {
            Ok(formatted) => formatted,
            Err(e) => return Err(self.fail(e, "Failed to fetch balance")),
        };

        let mut state = self.state.write().await;
        let still_current = state.epoch == epoch
            && state.connected
            && state.address.as_deref() == Some(address.as_str())
            && state
                .chain_id
                .as_deref()
                .is_some_and(|c| self.networks.is_supported(c));
        if !still_current {
            tracing::debug!(%address, "discarding stale balance");
            return Ok(None);
        }

        state.balance = Some(formatted.clone());
        Ok(Some(formatted))
    }

    /// Ask the wallet to switch to `target`, which must be the supported
    /// network. Success is observed through the chain-changed event.
    pub async fn switch_network(&self, target: &str) -> Result<(), WalletError> {
        let provider = match self.provider() {
            Ok(p) => p,
            Err(e) => {
                let message = e.to_string();
                return Err(self.fail(e, message));
            }
        };

        let supported = self.networks.supported();
        if parse_chain_id(target) != Some(supported.chain_id) {
            let err = WalletError::UnsupportedNetwork {
                expected: supported.name.clone(),
            };
            let message = err.to_string();
            return Err(self.fail(err, message));
        }

        match provider.switch_chain(&supported.hex_chain_id()).await {
            Ok(()) => {
                tracing::info!(chain_id = %supported.hex_chain_id(), "network switch requested");
                Ok(())
            }
            Err(e) if e.is_user_rejection() => Err(self.fail(
                WalletError::UserRejected,
                "Network switch rejected by user",
            )),
            Err(e) if e.is_request_pending() => Err(self.fail(
                WalletError::RequestPending,
                "Network switch already pending. Please check your wallet.",
            )),
            Err(e) => {
                let message = format!("Failed to switch network: {}", e.message);
                Err(self.fail(e.into(), message))
            }
        }
    }

    pub async fn switch_to_supported_network(&self) -> Result<(), WalletError> {
        let target = self.networks.supported().hex_chain_id();
        self.switch_network(&target).await
    }

    pub async fn set_draft(&self, input: &str) {
        self.state.write().await.draft = input.to_string();
    }

    /// Submit `setValue(new_value)` through the wallet.
    ///
    /// Empty input and an unsupported network are rejected without touching
    /// the provider. Once accepted the hash is recorded as pending and a
    /// background task awaits confirmation.
    pub async fn submit_value(&self, new_value: &str) -> Result<String, WalletError> {
        if new_value.trim().is_empty() {
            return Err(self.fail(WalletError::EmptyValue, "Please enter a value"));
        }

        let (from, connected, network_valid) = {
            let state = self.state.read().await;
            (state.address.clone(), state.connected, state.network_valid)
        };
        if !connected {
            return Err(self.fail(
                WalletError::NotConnected,
                "Please connect your wallet first",
            ));
        }
        if !network_valid {
            let expected = self.networks.supported().name.clone();
            let message = format!("Wrong network! Please switch to {expected}");
            return Err(self.fail(WalletError::UnsupportedNetwork { expected }, message));
        }

        let value = match parse_unsigned(new_value) {
            Ok(v) => v,
            Err(e) => {
                let message = e.to_string();
                return Err(self.fail(e, message));
            }
        };
        let provider = self.provider()?;

        let call = ContractCall::set_value(self.config.contract_address, from, value);
        let tx_hash = match provider.send_transaction(call).await {
            Ok(hash) => hash,
            Err(e) => return Err(self.transaction_failure(e)),
        };

        self.state.write().await.pending_tx = Some(tx_hash.clone());
        tracing::info!(%tx_hash, %value, "setValue submitted");
        self.notifier.show(
            NoticeKind::Info,
            format!(
                "Transaction submitted! Hash: {}...",
                truncate_message(&tx_hash, 10)
            ),
        );

        let controller = self.clone();
        let hash = tx_hash.clone();
        tokio::spawn(async move {
            if let Err(e) = controller.await_confirmation(&hash).await {
                tracing::warn!(tx_hash = %hash, error = %e, "transaction not confirmed");
            }
        });

        Ok(tx_hash)
    }

    fn transaction_failure(&self, e: ProviderError) -> WalletError {
        tracing::warn!(error = %e, "setValue submission failed");
        if e.is_user_rejection() {
            return self.fail(WalletError::UserRejected, "You rejected the transaction");
        }
        let diagnostic = truncate_message(&e.message, MAX_DIAGNOSTIC_CHARS);
        let message = format!("Transaction failed: {diagnostic}");
        self.fail(WalletError::TransactionFailed(diagnostic), message)
    }

    /// Poll for the receipt of `tx_hash` until it is included or the
    /// confirmation timeout passes.
    ///
    /// On success the pending hash is cleared and, after the settle delay,
    /// the contract value is re-read and the draft input reset.
    pub async fn await_confirmation(&self, tx_hash: &str) -> Result<TxReceipt, WalletError> {
        let provider = self.provider()?;
        let deadline = tokio::time::Instant::now() + self.config.confirmation_timeout;

        let receipt = loop {
            match provider.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => break receipt,
                Ok(None) => {}
                Err(e) => tracing::debug!(%tx_hash, error = %e, "receipt poll failed"),
            }
            if tokio::time::Instant::now() >= deadline {
                self.clear_pending(tx_hash).await;
                return Err(self.fail(
                    WalletError::TransactionFailed("confirmation timed out".into()),
                    "Transaction not confirmed in time",
                ));
            }
            tokio::time::sleep(self.config.receipt_poll_interval).await;
        };

        self.clear_pending(tx_hash).await;

        if !receipt.success {
            return Err(self.fail(
                WalletError::TransactionFailed("transaction reverted".into()),
                "Transaction reverted",
            ));
        }

        tracing::info!(%tx_hash, block = ?receipt.block_number, "setValue confirmed");
        self.notifier.show(
            NoticeKind::Success,
            "Transaction confirmed! Refreshing value...",
        );

        tokio::time::sleep(self.config.settle_delay).await;
        if let Err(e) = self.refresh_value().await {
            tracing::warn!(error = %e, "value re-read after confirmation failed");
        }
        self.state.write().await.draft.clear();

        Ok(receipt)
    }

    async fn clear_pending(&self, tx_hash: &str) {
        let mut state = self.state.write().await;
        if state.pending_tx.as_deref() == Some(tx_hash) {
            state.pending_tx = None;
        }
    }

    /// Read `getValue()` through the wallet and store it.
    pub async fn refresh_value(&self) -> Result<String, WalletError> {
        let provider = self.provider()?;
        let data = match provider
            .call(ContractCall::get_value(self.config.contract_address))
            .await
        {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "getValue call failed");
                return Err(self.fail(e.into(), "Failed to read contract value"));
            }
        };

        let value = ISimpleStorage::getValueCall::abi_decode_returns(&data)
            .map_err(|e| WalletError::InvalidResponse(format!("getValue returned {data}: {e}")))?
            .to_string();

        self.state.write().await.value = Some(value.clone());
        Ok(value)
    }

    /// Dispatch a provider-pushed event.
    pub async fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => self.accounts_changed(accounts).await,
            ProviderEvent::ChainChanged(chain_id) => self.chain_changed(chain_id).await,
        }
    }

    pub async fn accounts_changed(&self, accounts: Vec<String>) {
        tracing::info!(?accounts, "accounts changed");

        let Some(first) = accounts.first() else {
            self.state.write().await.reset();
            self.notifier.show(NoticeKind::Error, "Wallet disconnected");
            return;
        };

        let address = normalize_address(first);
        {
            let mut state = self.state.write().await;
            state.connected = true;
            state.connecting = false;
            state.address = Some(address.clone());
            state.balance = None;
            state.bump_epoch();
        }
        self.notifier.show(
            NoticeKind::Info,
            format!("Switched to account: {}", shorten_address(&address)),
        );

        if let Err(e) = self.validate_network().await {
            tracing::warn!(error = %e, "network validation after account change failed");
        }
    }

    /// Single re-entry point after any chain switch: records the new chain,
    /// drops the old balance and re-validates unconditionally.
    pub async fn chain_changed(&self, chain_id: String) {
        let chain_id = normalize_chain_id(&chain_id);
        tracing::info!(%chain_id, "chain changed");

        let network = self
            .networks
            .lookup(&chain_id)
            .filter(|n| n.is_supported)
            .cloned();
        {
            let mut state = self.state.write().await;
            state.chain_id = Some(chain_id);
            state.balance = None;
            state.network_valid = network.is_some();
            state.bump_epoch();
        }

        if let Err(e) = self.validate_network().await {
            tracing::warn!(error = %e, "network validation after chain change failed");
        }

        match network {
            Some(network) => self
                .notifier
                .show(NoticeKind::Info, format!("Switched to {}", network.name)),
            None => self.notifier.show(
                NoticeKind::Warning,
                format!(
                    "Switched to unsupported network. Please use {}.",
                    self.networks.supported().name
                ),
            ),
        };
    }

    /// Subscribe to provider events and process them in delivery order on
    /// a background task.
    pub fn listen(&self) -> Result<JoinHandle<()>, WalletError> {
        let mut events = self.provider()?.subscribe();
        let controller = self.clone();

        Ok(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => controller.handle_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "provider events lagged, revalidating network");
                        if let Err(e) = controller.validate_network().await {
                            tracing::warn!(error = %e, "revalidation after lag failed");
                        }
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("provider event stream closed");
                        break;
                    }
                }
            }
        }))
    }
}

fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}
