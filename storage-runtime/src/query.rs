//! `ChainQueryService`: validated reads and event queries against the
//! SimpleStorage contract.

use std::sync::Arc;

use alloy::primitives::Address;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::chain::{ChainReader, RpcChainReader, ValueUpdatedLog};
use crate::classify::{MarkerClassifier, TransportClassifier};
use crate::config::{MAX_BLOCK_RANGE, ServiceConfig};
use crate::error::{QueryError, TransportFailure};

/// Latest contract value together with the block height observed alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LatestValue {
    pub value: String,
    pub contract_address: String,
    pub block_number: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValueUpdatedEvent {
    pub block_number: Option<String>,
    pub value: String,
    pub tx_hash: Option<String>,
    pub log_index: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub from_block: i64,
    pub to_block: i64,
    pub total_events: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    pub events: Vec<ValueUpdatedEvent>,
    pub pagination: Pagination,
    pub contract_address: String,
    pub timestamp: String,
}

impl From<ValueUpdatedLog> for ValueUpdatedEvent {
    fn from(log: ValueUpdatedLog) -> Self {
        Self {
            block_number: log.block_number.map(|n| n.to_string()),
            value: log.value.to_string(),
            tx_hash: log
                .tx_hash
                .map(|h| format!("0x{}", hex::encode(h.as_slice()))),
            log_index: log.log_index,
        }
    }
}

/// Stateless request handler over a [`ChainReader`].
///
/// One instance is built per process and shared behind an `Arc`; every call
/// is independent and nothing is cached or retried.
pub struct ChainQueryService {
    reader: Arc<dyn ChainReader>,
    classifier: Box<dyn TransportClassifier>,
    contract_address: Address,
    max_block_range: u64,
}

impl ChainQueryService {
    pub fn new(reader: Arc<dyn ChainReader>, contract_address: Address) -> Self {
        Self {
            reader,
            classifier: Box::new(MarkerClassifier),
            contract_address,
            max_block_range: MAX_BLOCK_RANGE,
        }
    }

    /// Build a service talking JSON-RPC to the configured endpoint.
    pub fn connect(config: &ServiceConfig) -> Result<Self, QueryError> {
        let reader = RpcChainReader::from_config(config)?;
        Ok(Self::new(Arc::new(reader), config.contract_address))
    }

    /// Swap the failure classification strategy.
    pub fn with_classifier(mut self, classifier: Box<dyn TransportClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Lowercase 0x-prefixed contract address, as echoed in every result.
    pub fn contract_address(&self) -> String {
        format!("{:#x}", self.contract_address)
    }

    /// Read the stored value and the current block height.
    ///
    /// The two reads run concurrently and are not atomic: the block number
    /// may be newer than the block the value was read at.
    pub async fn get_latest_value(&self) -> Result<LatestValue, QueryError> {
        let (value, block_number) =
            futures::future::join(self.reader.stored_value(), self.reader.block_number()).await;

        let value = value.map_err(|e| self.fail("getValue", e))?;
        let block_number = block_number.map_err(|e| self.fail("blockNumber", e))?;

        tracing::debug!(%value, block_number, "read latest contract value");

        Ok(LatestValue {
            value: value.to_string(),
            contract_address: self.contract_address(),
            block_number: block_number.to_string(),
            timestamp: now_timestamp(),
        })
    }

    /// Query `ValueUpdated` events over the inclusive `[from_block, to_block]`.
    ///
    /// Bounds are validated before any RPC call, in this order: span ceiling,
    /// non-negative bounds, ordering.
    pub async fn get_value_updated_events(
        &self,
        from_block: i64,
        to_block: i64,
    ) -> Result<EventPage, QueryError> {
        let (from, to) = self.validate_range(from_block, to_block)?;

        let logs = self
            .reader
            .value_updated_logs(from, to)
            .await
            .map_err(|e| self.fail("getLogs", e))?;

        let events: Vec<ValueUpdatedEvent> = logs.into_iter().map(Into::into).collect();
        tracing::debug!(from_block, to_block, total = events.len(), "queried ValueUpdated events");

        Ok(EventPage {
            pagination: Pagination {
                from_block,
                to_block,
                total_events: events.len(),
            },
            events,
            contract_address: self.contract_address(),
            timestamp: now_timestamp(),
        })
    }

    fn validate_range(&self, from_block: i64, to_block: i64) -> Result<(u64, u64), QueryError> {
        let span = i128::from(to_block) - i128::from(from_block);
        if span > i128::from(self.max_block_range) {
            return Err(QueryError::RangeTooLarge {
                max: self.max_block_range,
            });
        }

        let (Ok(from), Ok(to)) = (u64::try_from(from_block), u64::try_from(to_block)) else {
            return Err(QueryError::NegativeBound);
        };

        if from > to {
            return Err(QueryError::InvertedRange);
        }

        Ok((from, to))
    }

    fn fail(&self, op: &str, failure: TransportFailure) -> QueryError {
        let err = self.classifier.classify(&failure);
        tracing::warn!(
            op,
            cause = %failure,
            category = err.code(),
            contract = %self.contract_address(),
            "RPC read failed"
        );
        err
    }
}

/// UTC timestamp in RFC 3339 with millisecond precision, e.g. `2026-01-18T10:30:00.000Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
