use thiserror::Error;

/// Errors surfaced by [`crate::query::ChainQueryService`].
///
/// The display strings are the messages handed back to HTTP callers; the
/// underlying transport cause is logged by the service and never embedded
/// here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Block range too large. Maximum {max} blocks per request.")]
    RangeTooLarge { max: u64 },

    #[error("Block numbers must be positive.")]
    NegativeBound,

    #[error("fromBlock must be less than or equal to toBlock.")]
    InvertedRange,

    #[error("RPC timeout. Please try again shortly.")]
    RpcTimeout,

    #[error("Unable to connect to the blockchain RPC.")]
    RpcUnreachable,

    #[error("An error occurred while reading blockchain data.")]
    InternalReadError,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl QueryError {
    /// Stable machine-readable code for the error category.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::RangeTooLarge { .. } => "RANGE_TOO_LARGE",
            QueryError::NegativeBound => "NEGATIVE_BOUND",
            QueryError::InvertedRange => "INVERTED_RANGE",
            QueryError::RpcTimeout => "RPC_TIMEOUT",
            QueryError::RpcUnreachable => "RPC_UNREACHABLE",
            QueryError::InternalReadError => "INTERNAL_READ_ERROR",
            QueryError::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// Input validation failures, reported before any RPC round-trip.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            QueryError::RangeTooLarge { .. } | QueryError::NegativeBound | QueryError::InvertedRange
        )
    }

    /// Whether the caller may reasonably retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueryError::RpcTimeout | QueryError::RpcUnreachable)
    }
}

/// Raw failure reported by a [`crate::chain::ChainReader`].
///
/// Carries only the descriptive message; classification into a
/// [`QueryError`] happens in [`crate::classify`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportFailure {
    pub message: String,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<url::ParseError> for QueryError {
    fn from(e: url::ParseError) -> Self {
        QueryError::ConfigError(format!("Invalid RPC URL: {e}"))
    }
}
