//! HTTP surface of the SimpleStorage query service.
//!
//! `GET /blockchain/value` and `POST /blockchain/events` wrap
//! [`ChainQueryService`] results in `{ success, data }` envelopes; failures
//! come back as `{ success: false, errorCode, errorMessage, ... }` with a
//! 400, 503 or 500 status.

pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use storage_runtime::ChainQueryService;

pub struct ApiState {
    pub service: ChainQueryService,
}

impl ApiState {
    pub fn new(service: ChainQueryService) -> Arc<Self> {
        Arc::new(Self { service })
    }
}

/// CORS from a comma-separated origin list; empty or `*` allows any origin.
pub fn cors_layer(origins: &str) -> CorsLayer {
    let origins = origins.trim();
    if origins == "*" || origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let parsed: Vec<_> = origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::blockchain::router())
        .with_state(state)
}
