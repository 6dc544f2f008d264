//! Response envelopes.
//!
//! Every endpoint under `/api/v1` answers with one of two shapes:
//! `{"status_code", "data", "message"}` on success and
//! `{"status_code", "message"}` on failure. The HTTP status always matches
//! `status_code`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP status code.
    pub status_code: u16,
    /// Payload.
    pub data: T,
    /// Human-readable summary.
    pub message: String,
}

impl<T> ApiResponse<T> {
    /// A 200 response carrying `data`.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            data,
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status code.
    pub status_code: u16,
    /// What went wrong.
    pub message: String,
}

impl ApiError {
    /// Create a failure envelope for `status`.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
