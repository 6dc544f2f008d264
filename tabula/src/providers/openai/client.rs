//! OpenAI-compatible API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use super::completion::CompletionModel;
use crate::config::Settings;
use crate::error::LlmError;
use crate::providers::ApiClient;

/// Default base URL (OpenRouter).
pub const OPENROUTER_API_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default `HTTP-Referer` header value.
pub const DEFAULT_REFERER: &str = "http://localhost:8000";

/// Client for an OpenAI-compatible chat completions API.
///
/// Cloning is cheap; clones share the connection pool.
///
/// ```rust,ignore
/// use tabula::providers::openai::OpenAIClient;
///
/// let client = OpenAIClient::builder()
///     .api_key("sk-or-...")
///     .base_url("https://openrouter.ai/api/v1")
///     .app_name("DataAnalysisAPI")
///     .timeout_secs(60)
///     .build()?;
/// ```
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: reqwest::Client,
    api_key: Arc<str>,
    base_url: Arc<str>,
    app_name: Option<Arc<str>>,
    referer: Arc<str>,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("app_name", &self.app_name)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl OpenAIClient {
    /// Create a client with `api_key` and default settings.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a builder.
    #[must_use]
    pub fn builder() -> OpenAIClientBuilder {
        OpenAIClientBuilder::default()
    }

    /// Create a client from application settings.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the HTTP client cannot be built.
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        Self::builder()
            .api_key(&settings.api_key)
            .base_url(&settings.base_url)
            .app_name(&settings.app_name)
            .build()
    }

    /// Create a completion model for `model_id`.
    #[must_use]
    pub fn completion_model(&self, model_id: impl Into<String>) -> CompletionModel {
        CompletionModel::new(self.clone(), model_id)
    }
}

impl ApiClient for OpenAIClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(4);
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&self.referer) {
            headers.insert(HeaderName::from_static("http-referer"), value);
        }
        if let Some(title) = self.app_name.as_deref()
            && let Ok(value) = HeaderValue::from_str(title)
        {
            headers.insert(HeaderName::from_static("x-title"), value);
        }
        headers
    }
}

/// Builder for [`OpenAIClient`].
#[derive(Debug, Default)]
pub struct OpenAIClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    app_name: Option<String>,
    referer: Option<String>,
    timeout_secs: Option<u64>,
}

impl OpenAIClientBuilder {
    /// Set the API key.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL. A trailing slash is dropped.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the application label sent as `X-Title`.
    #[must_use]
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Set the `HTTP-Referer` header value.
    #[must_use]
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Set the per-request timeout in seconds. Default is none.
    #[must_use]
    pub const fn timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] of kind `Auth` when no API key was set, or of kind
    /// `Internal` when the HTTP client cannot be constructed.
    pub fn build(self) -> Result<OpenAIClient, LlmError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::auth("openai", "API key is required"))?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| OPENROUTER_API_BASE_URL.to_owned());

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let http_client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(OpenAIClient {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').into(),
            app_name: self.app_name.map(Into::into),
            referer: self.referer.unwrap_or_else(|| DEFAULT_REFERER.to_owned()).into(),
        })
    }
}
