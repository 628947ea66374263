//! Transport failure classification.
//!
//! Every RPC failure in the query service funnels through a single
//! [`TransportClassifier`]. Classification never retries; the caller
//! decides retry cadence from [`QueryError::is_retryable`].

use crate::error::{QueryError, TransportFailure};

/// Maps a raw transport failure to a stable [`QueryError`] category.
pub trait TransportClassifier: Send + Sync {
    fn classify(&self, failure: &TransportFailure) -> QueryError;
}

const TIMEOUT_MARKERS: &[&str] = &["timeout"];
const UNREACHABLE_MARKERS: &[&str] = &["network", "fetch", "failed"];

/// Substring matcher over the failure message.
///
/// Markers are checked in priority order: timeout first, then
/// unreachability; anything else is an internal read error. Matching is
/// case-sensitive, so transport descriptions must use the lowercase markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerClassifier;

impl TransportClassifier for MarkerClassifier {
    fn classify(&self, failure: &TransportFailure) -> QueryError {
        classify_message(&failure.message)
    }
}

/// Classify a bare message with the default marker list.
pub fn classify_message(message: &str) -> QueryError {
    let contains_any = |markers: &[&str]| markers.iter().any(|m| message.contains(m));

    if contains_any(TIMEOUT_MARKERS) {
        QueryError::RpcTimeout
    } else if contains_any(UNREACHABLE_MARKERS) {
        QueryError::RpcUnreachable
    } else {
        QueryError::InternalReadError
    }
}
