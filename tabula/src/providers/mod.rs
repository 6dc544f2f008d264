//! Model access.
//!
//! The conversation loop talks to language models only through the [`Model`]
//! trait. Two implementations ship with the crate:
//!
//! - **OpenAI-compatible** ([`openai::CompletionModel`]): any chat-completions
//!   endpoint with function calling, OpenRouter by default
//! - **Mock** ([`MockModel`]): scripted or closure-driven responses for tests
//!
//! ```rust,ignore
//! use tabula::providers::openai::OpenAIClient;
//!
//! let client = OpenAIClient::builder()
//!     .api_key("sk-or-...")
//!     .app_name("DataAnalysisAPI")
//!     .build()?;
//! let model = client.completion_model("openai/gpt-4o-mini");
//! ```

mod types;

pub mod mock;
pub mod openai;

pub use mock::MockModel;
pub use openai::OpenAIClient;
pub use types::{GenerateOptions, ModelResponse, TokenUsage};

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::error::LlmError;
use crate::message::ChatMessage;

/// A chat model that can request function calls.
#[async_trait]
pub trait Model: Send + Sync {
    /// Model identifier (e.g. `"openai/gpt-4o-mini"`).
    fn model_id(&self) -> &str;

    /// Generate the next assistant message for `messages`.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the provider is unreachable, rejects the
    /// request, or answers with something that is not a chat completion.
    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerateOptions,
    ) -> Result<ModelResponse, LlmError>;

    /// Provider name used in logs and errors.
    fn provider(&self) -> &'static str {
        "unknown"
    }
}

/// Base behaviour of HTTP API clients.
pub trait ApiClient: Clone + Send + Sync {
    /// Base URL for API requests.
    fn base_url(&self) -> &str;

    /// Shared HTTP client.
    fn http_client(&self) -> &reqwest::Client;

    /// Headers sent with every request.
    fn auth_headers(&self) -> HeaderMap;
}

/// Convert u64 to u32, saturating at `u32::MAX`.
#[inline]
#[must_use]
pub fn saturating_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
