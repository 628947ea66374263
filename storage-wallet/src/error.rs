use thiserror::Error;

/// EIP-1193 user rejection.
pub const USER_REJECTED: i64 = 4001;
/// EIP-1193 unsupported method.
pub const UNSUPPORTED_METHOD: i64 = 4200;
/// Wallet already has a request of this kind awaiting the user.
pub const REQUEST_PENDING: i64 = -32002;
/// JSON-RPC internal error.
pub const INTERNAL_ERROR: i64 = -32603;

const USER_REJECTION_MARKER: &str = "user rejected";

/// Error reported by a wallet provider, carrying its numeric code verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected(message: impl Into<String>) -> Self {
        Self::new(USER_REJECTED, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    /// Rejection is recognized by code `4001` or by the rejection marker in
    /// the message, since some wallets wrap the code away.
    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED
            || self
                .message
                .to_ascii_lowercase()
                .contains(USER_REJECTION_MARKER)
    }

    pub fn is_request_pending(&self) -> bool {
        self.code == REQUEST_PENDING
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("No wallet detected. Please install a wallet extension.")]
    ProviderMissing,

    #[error("No accounts found. Please unlock your wallet.")]
    NoAccounts,

    #[error("Request rejected by user")]
    UserRejected,

    #[error("Request already pending. Please check your wallet.")]
    RequestPending,

    #[error("Unsupported network. Please switch to {expected}.")]
    UnsupportedNetwork { expected: String },

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Please enter a value")]
    EmptyValue,

    #[error("Invalid value '{0}': expected an unsigned integer")]
    InvalidValue(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}
