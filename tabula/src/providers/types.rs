//! Request and response types shared by all providers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::{ChatMessage, ToolCall};
use crate::tool::ToolDefinition;

/// Token usage reported for one generation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    /// Prompt tokens.
    pub input_tokens: u32,
    /// Completion tokens.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Create usage with the given counts.
    #[must_use]
    pub const fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Total tokens.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens = self.input_tokens.saturating_add(rhs.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(rhs.output_tokens);
    }
}

/// One generated assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The assistant message.
    pub message: ChatMessage,
    /// Token usage, when the provider reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    /// Raw provider payload.
    #[serde(skip)]
    pub raw: Option<Value>,
}

impl ModelResponse {
    /// Wrap a message.
    #[must_use]
    pub const fn new(message: ChatMessage) -> Self {
        Self {
            message,
            token_usage: None,
            raw: None,
        }
    }

    /// A plain text answer.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(ChatMessage::assistant(content))
    }

    /// A turn requesting `calls`.
    #[must_use]
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self::new(ChatMessage::assistant_tool_calls(None, calls))
    }

    /// Set token usage.
    #[must_use]
    pub const fn with_token_usage(mut self, usage: TokenUsage) -> Self {
        self.token_usage = Some(usage);
        self
    }

    /// Set the raw payload.
    #[must_use]
    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Whether the model asked for function calls.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        self.message.has_tool_calls()
    }
}

/// Options for one generation request.
///
/// Advertised tools are always offered with `tool_choice: auto`; the model
/// decides whether to call them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Functions the model may call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerateOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise `tools`.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the temperature, leaving the provider default when `None`.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Whether any tools are advertised.
    #[must_use]
    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_usage_accumulates() {
        let mut total = TokenUsage::default();
        total += TokenUsage::new(10, 5);
        total += TokenUsage::new(u32::MAX, 1);
        assert_eq!(total.input_tokens, u32::MAX);
        assert_eq!(total.output_tokens, 6);
    }

    #[test]
    fn test_response_constructors() {
        assert!(!ModelResponse::text("done").has_tool_calls());
        let calls = ModelResponse::tool_calls(vec![ToolCall::new("c", "list_tables", json!({}))]);
        assert!(calls.has_tool_calls());
    }
}
