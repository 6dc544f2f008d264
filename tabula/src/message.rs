//! Transcript message types.
//!
//! [`ChatMessage`] serializes to the OpenAI chat-completions wire shape, so the
//! same value is sent to the provider, returned to callers as conversation
//! history, and accepted back as history on the next exchange. Plain
//! `{"role": ..., "content": ...}` pairs deserialize into it as well.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Fixed instructions for the model.
    System,
    /// The human asking questions.
    User,
    /// The model.
    Assistant,
    /// Output of a function the model called.
    Tool,
}

impl MessageRole {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced the message.
    pub role: MessageRole,
    /// Text content, absent for some assistant tool-call turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Function calls requested by an assistant message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool messages: the id of the call being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For tool messages: the function name being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(MessageRole::System, content)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(MessageRole::User, content)
    }

    /// Create an assistant text message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(MessageRole::Assistant, content)
    }

    /// Create an assistant message carrying function calls.
    ///
    /// Content is always present (empty when the model sent none); several
    /// OpenAI-compatible gateways reject a null content next to tool calls.
    #[must_use]
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(content.unwrap_or_default()),
            tool_calls,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a tool result message answering `tool_call_id`.
    #[must_use]
    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
        }
    }

    /// Text content, if any.
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Whether this message requests function calls.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Kind of a tool call. Only functions exist today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallKind {
    /// A function call.
    #[default]
    Function,
}

/// A function invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back on the tool message.
    pub id: String,
    /// Always `function`.
    #[serde(rename = "type", default)]
    pub kind: ToolCallKind,
    /// The function and its arguments.
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a function call.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            kind: ToolCallKind::Function,
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }

    /// The requested function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// The requested arguments.
    #[must_use]
    pub const fn arguments(&self) -> &Value {
        &self.function.arguments
    }
}

/// Function name plus arguments.
///
/// On the wire `arguments` is a JSON-encoded string; in memory it is the decoded
/// value. Text the model produced that is not valid JSON is kept verbatim as a
/// [`Value::String`] so the dispatcher can report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// Decoded arguments.
    #[serde(with = "arguments_text")]
    pub arguments: Value,
}

mod arguments_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub(super) fn serialize<S: Serializer>(value: &Value, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Value::String(raw) => serializer.serialize_str(raw),
            other => serializer.serialize_str(&other.to_string()),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => decode(raw),
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        })
    }

    fn decode(raw: String) -> Value {
        if raw.trim().is_empty() {
            return Value::Object(serde_json::Map::new());
        }
        serde_json::from_str(&raw).unwrap_or(Value::String(raw))
    }
}
