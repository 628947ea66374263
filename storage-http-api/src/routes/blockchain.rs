use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, extract::State, routing::get, routing::post};
use serde::Deserialize;
use std::sync::Arc;

use storage_runtime::{EventPage, LatestValue};

use crate::ApiState;
use crate::response::{ApiError, ApiResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsRequest {
    pub from_block: i64,
    pub to_block: i64,
}

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/blockchain/value", get(get_value))
        .route("/blockchain/events", post(get_events))
}

async fn get_value(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ApiResponse<LatestValue>>, ApiError> {
    let value = state
        .service
        .get_latest_value()
        .await
        .map_err(|e| ApiError::query(e, state.service.contract_address()))?;
    Ok(ApiResponse::ok(value))
}

async fn get_events(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<EventsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<EventPage>>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "rejected events request body");
        ApiError::bad_request(
            "Request body must be JSON with integer fromBlock and toBlock.",
            state.service.contract_address(),
        )
    })?;

    let page = state
        .service
        .get_value_updated_events(request.from_block, request.to_block)
        .await
        .map_err(|e| ApiError::query(e, state.service.contract_address()))?;
    Ok(ApiResponse::ok(page))
}
