//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tabula::LlmError;
use tabula::store::StoreError;
use tracing::{error, warn};

use crate::response::ApiError;

/// Result alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Failures a handler can answer with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request is malformed or fails validation.
    #[error("{0}")]
    BadRequest(String),

    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The model provider failed.
    #[error("model provider error: {0}")]
    Upstream(#[source] LlmError),

    /// The exchange did not finish in time.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TableNotFound(_) => Self::NotFound(err.to_string()),
            StoreError::InvalidIdentifier(_) | StoreError::InvalidImport(_) => {
                Self::BadRequest(err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<tabula::Error> for AppError {
    fn from(err: tabula::Error) -> Self {
        match err {
            tabula::Error::Llm(e) => Self::Upstream(e),
            tabula::Error::Store(e) => e.into(),
            tabula::Error::InvalidInput(msg) => Self::BadRequest(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        ApiError::new(status, self.to_string()).into_response()
    }
}
