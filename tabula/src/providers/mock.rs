//! Deterministic model for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{GenerateOptions, Model, ModelResponse};
use crate::error::LlmError;
use crate::message::ChatMessage;

type Responder =
    Box<dyn Fn(&[ChatMessage], &GenerateOptions) -> Result<ModelResponse, LlmError> + Send + Sync>;

enum Behavior {
    Script(Mutex<VecDeque<Result<ModelResponse, LlmError>>>),
    Repeat(ModelResponse),
    Func(Responder),
}

/// A [`Model`] whose answers are fixed in advance.
///
/// ```rust,ignore
/// let model = MockModel::scripted(vec![
///     ModelResponse::tool_calls(vec![ToolCall::new("c1", "list_tables", json!({}))]),
///     ModelResponse::text("There are two tables."),
/// ]);
/// ```
pub struct MockModel {
    model_id: String,
    behavior: Behavior,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl std::fmt::Debug for MockModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockModel")
            .field("model_id", &self.model_id)
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

impl MockModel {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            model_id: "mock".to_owned(),
            behavior,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer with `responses` in order, then fail.
    #[must_use]
    pub fn scripted(responses: Vec<ModelResponse>) -> Self {
        Self::with_behavior(Behavior::Script(Mutex::new(
            responses.into_iter().map(Ok).collect(),
        )))
    }

    /// Answer with `results` in order, errors included, then fail.
    #[must_use]
    pub fn scripted_results(results: Vec<Result<ModelResponse, LlmError>>) -> Self {
        Self::with_behavior(Behavior::Script(Mutex::new(results.into())))
    }

    /// Answer every request with a clone of `response`.
    #[must_use]
    pub fn repeating(response: ModelResponse) -> Self {
        Self::with_behavior(Behavior::Repeat(response))
    }

    /// Compute each answer from the transcript.
    #[must_use]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[ChatMessage], &GenerateOptions) -> Result<ModelResponse, LlmError>
            + Send
            + Sync
            + 'static,
    {
        Self::with_behavior(Behavior::Func(Box::new(f)))
    }

    /// Override the reported model id.
    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Number of `generate` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Transcripts received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Model for MockModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerateOptions,
    ) -> Result<ModelResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.clone());
        }

        match &self.behavior {
            Behavior::Script(queue) => queue
                .lock()
                .map_err(|e| LlmError::internal(e.to_string()).for_provider("mock"))?
                .pop_front()
                .unwrap_or_else(|| {
                    Err(LlmError::internal("mock script exhausted").for_provider("mock"))
                }),
            Behavior::Repeat(response) => Ok(response.clone()),
            Behavior::Func(f) => f(&messages, &options),
        }
    }
}
