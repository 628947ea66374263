//! JSON envelopes shared by every route.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use storage_runtime::{QueryError, now_timestamp};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error_code: &'static str,
    pub error_message: String,
    pub contract_address: String,
    pub timestamp: String,
}

/// A failed request, rendered as `{ success: false, ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    contract_address: String,
}

impl ApiError {
    pub fn query(err: QueryError, contract_address: String) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if err.is_retryable() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
            contract_address,
        }
    }

    /// Request body that could not be parsed.
    pub fn bad_request(message: impl Into<String>, contract_address: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_REQUEST",
            message: message.into(),
            contract_address,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error_code: self.code,
            error_message: self.message,
            contract_address: self.contract_address,
            timestamp: now_timestamp(),
        };
        (self.status, Json(body)).into_response()
    }
}
