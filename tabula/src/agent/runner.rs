//! The tool-calling conversation loop.
//!
//! [`Analyst::chat`] drives one exchange:
//!
//! 1. Seed the transcript (system prompt, capped history, the question)
//! 2. Send the transcript and the tool catalog to the model
//! 3. Classify the response into a [`NextStep`]
//! 4. On tool calls, dispatch each in issued order, append the results and
//!    loop back to step 2
//! 5. On a text answer, append it and return
//!
//! The loop ends with a fixed apology, not an error, when the iteration budget
//! runs out. Model failures end the exchange with [`Error::Llm`](crate::Error).

use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::prompt::{BUDGET_EXHAUSTED_ANSWER, SYSTEM_PROMPT};
use super::result::{ChatOutcome, FunctionCallRecord, NextStep};
use crate::config::{DEFAULT_MAX_HISTORY_MESSAGES, DEFAULT_MAX_ITERATIONS, Settings};
use crate::error::{Error, Result};
use crate::message::{ChatMessage, MessageRole, ToolCall};
use crate::providers::{GenerateOptions, Model, TokenUsage};
use crate::tool::{Dispatcher, ToolDefinition};

/// Limits and prompt for [`Analyst`].
#[derive(Debug, Clone)]
pub struct AnalystConfig {
    /// Model round trips per exchange, at least 1.
    pub max_iterations: usize,
    /// Most recent caller-supplied history messages kept.
    pub max_history_messages: usize,
    /// System prompt used when the history carries none.
    pub system_prompt: String,
    /// Sampling temperature, provider default when `None`.
    pub temperature: Option<f32>,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_history_messages: DEFAULT_MAX_HISTORY_MESSAGES,
            system_prompt: SYSTEM_PROMPT.to_owned(),
            temperature: None,
        }
    }
}

impl AnalystConfig {
    /// Take limits from application settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_iterations: settings.max_iterations,
            max_history_messages: settings.max_history_messages,
            ..Self::default()
        }
    }
}

/// Answers questions about the data store by letting a model call tools.
///
/// `Analyst` keeps no per-exchange state; concurrent calls to
/// [`chat`](Self::chat) are independent.
#[derive(Clone)]
pub struct Analyst {
    model: Arc<dyn Model>,
    dispatcher: Arc<Dispatcher>,
    config: AnalystConfig,
}

impl std::fmt::Debug for Analyst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyst")
            .field("model", &self.model.model_id())
            .field("tools", &self.dispatcher.registry().names())
            .field("config", &self.config)
            .finish()
    }
}

impl Analyst {
    /// Create an analyst with default limits.
    #[must_use]
    pub fn new(model: Arc<dyn Model>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            model,
            dispatcher,
            config: AnalystConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: AnalystConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the iteration budget. Zero is raised to one.
    #[must_use]
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max.max(1);
        self
    }

    /// Set the history cap.
    #[must_use]
    pub const fn max_history_messages(mut self, max: usize) -> Self {
        self.config.max_history_messages = max;
        self
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &AnalystConfig {
        &self.config
    }

    /// Identifier of the underlying model.
    #[must_use]
    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Answer `question`, continuing `history` when given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank question and [`Error::Llm`]
    /// when the model cannot be reached or answers malformed output. Tool
    /// failures never surface here; the model sees them as results.
    #[instrument(skip(self, question, history), fields(model = %self.model.model_id()))]
    pub async fn chat(
        &self,
        question: &str,
        history: Option<Vec<ChatMessage>>,
    ) -> Result<ChatOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::invalid_input("question must not be empty"));
        }

        let mut transcript = seed_transcript(
            history.unwrap_or_default(),
            &self.config.system_prompt,
            self.config.max_history_messages,
        );
        transcript.push(ChatMessage::user(question));

        let definitions: Vec<ToolDefinition> = self.dispatcher.registry().definitions();
        let max_iterations = self.config.max_iterations.max(1);
        let mut function_calls = Vec::new();
        let mut usage = TokenUsage::default();

        for iteration in 1..=max_iterations {
            debug!(iteration, messages = transcript.len(), "Requesting model turn");

            let options = GenerateOptions::new()
                .with_tools(definitions.clone())
                .with_temperature(self.config.temperature);

            let response = self.model.generate(transcript.clone(), options).await?;
            if let Some(turn_usage) = response.token_usage {
                usage += turn_usage;
            }

            match NextStep::classify(&response.message) {
                NextStep::FinalAnswer { answer } => {
                    transcript.push(response.message);
                    info!(
                        iterations = iteration,
                        calls = function_calls.len(),
                        exhausted = false,
                        "Exchange finished"
                    );
                    return Ok(self.outcome(answer, function_calls, transcript, iteration, usage, false));
                }
                NextStep::ToolCalls { calls } => {
                    transcript.push(response.message);
                    self.execute_tool_calls(&calls, &mut transcript, &mut function_calls)
                        .await;
                }
            }
        }

        info!(
            iterations = max_iterations,
            calls = function_calls.len(),
            exhausted = true,
            "Exchange hit the iteration budget"
        );
        Ok(self.outcome(
            BUDGET_EXHAUSTED_ANSWER.to_owned(),
            function_calls,
            transcript,
            max_iterations,
            usage,
            true,
        ))
    }

    /// Dispatch `calls` sequentially, appending a tool message and a record
    /// for each.
    async fn execute_tool_calls(
        &self,
        calls: &[ToolCall],
        transcript: &mut Vec<ChatMessage>,
        records: &mut Vec<FunctionCallRecord>,
    ) {
        for call in calls {
            let result = self.dispatcher.dispatch(call.name(), call.arguments()).await;
            transcript.push(ChatMessage::tool(&call.id, call.name(), result.to_string()));
            records.push(FunctionCallRecord {
                function: call.name().to_owned(),
                arguments: call.arguments().clone(),
                result,
            });
        }
    }

    fn outcome(
        &self,
        answer: String,
        function_calls: Vec<FunctionCallRecord>,
        transcript: Vec<ChatMessage>,
        iterations: usize,
        usage: TokenUsage,
        exhausted: bool,
    ) -> ChatOutcome {
        ChatOutcome {
            answer,
            function_calls,
            transcript,
            model: self.model.model_id().to_owned(),
            iterations,
            usage,
            exhausted,
        }
    }
}

/// Build the opening transcript from caller history.
///
/// A leading system message is kept (the default prompt is prepended when
/// there is none), and only the last `cap` other messages survive. Tool
/// messages cut off from their assistant turn by the cap are dropped as well.
fn seed_transcript(history: Vec<ChatMessage>, system_prompt: &str, cap: usize) -> Vec<ChatMessage> {
    let mut history = history.into_iter().peekable();
    let system = match history.peek() {
        Some(first) if first.role == MessageRole::System => history.next(),
        _ => None,
    };

    let rest: Vec<ChatMessage> = history.collect();
    let skip = rest.len().saturating_sub(cap);
    let kept = rest
        .into_iter()
        .skip(skip)
        .skip_while(|m| m.role == MessageRole::Tool);

    std::iter::once(system.unwrap_or_else(|| ChatMessage::system(system_prompt)))
        .chain(kept)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::providers::{MockModel, ModelResponse};
    use crate::store::DataStore;
    use crate::tools::database_registry;

    fn analyst(model: MockModel) -> Analyst {
        let store = Arc::new(DataStore::in_memory().unwrap());
        let dispatcher = Arc::new(Dispatcher::new(database_registry(), store));
        Analyst::new(Arc::new(model), dispatcher)
    }

    #[test]
    fn test_seed_prepends_system_prompt() {
        let seeded = seed_transcript(vec![ChatMessage::user("earlier")], "SYS", 50);
        assert_eq!(seeded[0], ChatMessage::system("SYS"));
        assert_eq!(seeded[1], ChatMessage::user("earlier"));
    }

    #[test]
    fn test_seed_keeps_caller_system_message() {
        let seeded = seed_transcript(vec![ChatMessage::system("custom")], "SYS", 50);
        assert_eq!(seeded, vec![ChatMessage::system("custom")]);
    }

    #[test]
    fn test_seed_caps_history_and_drops_orphans() {
        let history = vec![
            ChatMessage::system("custom"),
            ChatMessage::user("q1"),
            ChatMessage::assistant_tool_calls(None, vec![ToolCall::new("c1", "list_tables", json!({}))]),
            ChatMessage::tool("c1", "list_tables", "{}"),
            ChatMessage::assistant("a1"),
        ];
        let seeded = seed_transcript(history, "SYS", 2);
        assert_eq!(
            seeded,
            vec![ChatMessage::system("custom"), ChatMessage::assistant("a1")]
        );
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected() {
        let model = MockModel::repeating(ModelResponse::text("unused"));
        let err = analyst(model).chat("   ", None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_immediate_answer() {
        let model = Arc::new(MockModel::scripted(vec![
            ModelResponse::text("Hello.").with_token_usage(TokenUsage::new(10, 2)),
        ]));
        let store = Arc::new(DataStore::in_memory().unwrap());
        let dispatcher = Arc::new(Dispatcher::new(database_registry(), store));
        let analyst = Analyst::new(model.clone(), dispatcher);

        let outcome = analyst.chat("hi", None).await.unwrap();
        assert_eq!(outcome.answer, "Hello.");
        assert!(outcome.function_calls.is_empty());
        assert_eq!(outcome.iterations, 1);
        assert!(!outcome.exhausted);
        assert_eq!(outcome.usage, TokenUsage::new(10, 2));
        assert_eq!(model.call_count(), 1);

        let roles: Vec<MessageRole> = outcome.transcript.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::System, MessageRole::User, MessageRole::Assistant]
        );
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = MockModel::scripted_results(vec![Err(crate::error::LlmError::network("down"))]);
        let err = analyst(model).chat("hi", None).await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }

    #[tokio::test]
    async fn test_malformed_arguments_become_tool_error() {
        let model = MockModel::scripted(vec![
            ModelResponse::tool_calls(vec![ToolCall::new(
                "c1",
                "execute_select_query",
                json!("{not json"),
            )]),
            ModelResponse::text("Sorry."),
        ]);
        let outcome = analyst(model).chat("q", None).await.unwrap();
        let result = &outcome.function_calls[0].result;
        assert_eq!(result["success"], false);
        assert!(
            result["error"]
                .as_str()
                .unwrap()
                .contains("arguments must be a JSON object, got text: {not json")
        );
        let tool_msg = &outcome.transcript[3];
        assert_eq!(tool_msg.role, MessageRole::Tool);
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("c1"));
    }
}
