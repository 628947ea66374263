pub mod error;
pub mod config;
pub mod contracts;
pub mod classify;
pub mod chain;
pub mod query;

pub use error::{QueryError, TransportFailure};
pub use config::ServiceConfig;
pub use query::{ChainQueryService, EventPage, LatestValue, Pagination, ValueUpdatedEvent, now_timestamp};
