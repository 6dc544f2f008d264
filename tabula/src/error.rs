//! Unified error types for tabula.
//!
//! The hierarchy mirrors the three failure domains of an exchange:
//! - LLM provider errors (authentication, rate limiting, malformed responses),
//!   which end the exchange
//! - Tool errors (bad arguments, rejected queries, store failures), which are
//!   rendered back to the model and never end the exchange
//! - Configuration errors, which are fatal at process start

use std::fmt;

use crate::config::ConfigError;
use crate::store::StoreError;

/// Result type alias for tabula operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for tabula.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// LLM provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool execution error.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Data store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The caller supplied an unusable request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid input error with a message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Error type for LLM provider operations.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LlmError {
    /// The error kind.
    pub kind: LlmErrorKind,
    /// The provider name (e.g., "openai", "mock").
    pub provider: Option<String>,
    /// Additional error message.
    pub message: String,
    /// Optional error code from the provider.
    pub code: Option<String>,
}

/// Categories of LLM errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LlmErrorKind {
    /// Authentication or authorization failure.
    Auth,
    /// Rate limit exceeded.
    RateLimited,
    /// Invalid request parameters.
    InvalidRequest,
    /// Response format error.
    ResponseFormat,
    /// Network or connection error.
    Network,
    /// HTTP status error.
    HttpStatus,
    /// Provider-specific error.
    Provider,
    /// Internal error.
    Internal,
}

impl LlmError {
    const fn with_kind(kind: LlmErrorKind, message: String) -> Self {
        Self {
            kind,
            provider: None,
            message,
            code: None,
        }
    }

    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::Auth, message.into()).for_provider(provider)
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self::with_kind(
            LlmErrorKind::RateLimited,
            "Rate limit exceeded. Please retry after some time.".into(),
        )
        .for_provider(provider)
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::InvalidRequest, message.into())
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::with_kind(
            LlmErrorKind::ResponseFormat,
            format!("Expected {}, got {}", expected.into(), got.into()),
        )
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::Network, message.into())
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            code: Some(status.to_string()),
            ..Self::with_kind(
                LlmErrorKind::HttpStatus,
                format!("HTTP {status}: {}", body.into()),
            )
        }
    }

    /// Create a provider-specific error.
    #[must_use]
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::Provider, message.into()).for_provider(provider)
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::Internal, message.into())
    }

    /// Attach the provider name.
    #[must_use]
    pub fn for_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Attach a provider error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{provider}] ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else if err.is_decode() {
            Self::response_format("JSON body", err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Error type for function execution failures.
///
/// Every variant is rendered into the transcript as `{"success": false, "error": ...}`
/// so the model can read it and react on its next turn.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// The model asked for a function that is not in the registry.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// Invalid arguments provided to the function.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The query-safety gate refused the statement.
    #[error("{0}")]
    QueryRejected(String),

    /// The data store failed while executing the function.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Output could not be rendered as JSON.
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ToolError {
    /// Create an invalid arguments error.
    #[must_use]
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a rejected-query error.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::QueryRejected(reason.into())
    }
}
