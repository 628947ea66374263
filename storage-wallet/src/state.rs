use serde::Serialize;

/// Wallet connection state, owned by [`crate::controller::ConnectionController`].
///
/// `balance` is only set while connected to the supported network; any
/// chain or account change clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    pub connected: bool,
    pub connecting: bool,
    /// Lowercase hex account.
    pub address: Option<String>,
    /// Lowercase hex chain id.
    pub chain_id: Option<String>,
    pub network_valid: bool,
    /// Native balance, 4 fractional digits.
    pub balance: Option<String>,
    pub pending_tx: Option<String>,
    /// Last value read from the contract.
    pub value: Option<String>,
    /// Pending user input for the next write.
    pub draft: String,
    /// Bumped on every connection, account or chain change. Writes
    /// prepared under an older epoch are dropped.
    #[serde(skip)]
    pub epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected { network_valid: bool },
}

impl ConnectionState {
    pub fn status(&self) -> ConnectionStatus {
        if self.connected {
            ConnectionStatus::Connected {
                network_valid: self.network_valid,
            }
        } else if self.connecting {
            ConnectionStatus::Connecting
        } else {
            ConnectionStatus::Disconnected
        }
    }

    pub(crate) fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Back to `Disconnected`. The chain id is kept since it still
    /// describes the wallet.
    pub(crate) fn reset(&mut self) {
        self.connected = false;
        self.connecting = false;
        self.address = None;
        self.balance = None;
        self.network_valid = false;
        self.bump_epoch();
    }
}
