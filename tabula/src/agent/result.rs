//! Exchange results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::{ChatMessage, ToolCall};
use crate::providers::TokenUsage;

/// Audit entry for one executed function call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallRecord {
    /// Function name as requested by the model.
    pub function: String,
    /// Arguments as requested by the model.
    pub arguments: Value,
    /// The dispatcher's result object.
    pub result: Value,
}

/// Outcome of one question/answer exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    /// Final answer text.
    pub answer: String,
    /// Every function call executed, in order.
    pub function_calls: Vec<FunctionCallRecord>,
    /// The full transcript, system prompt first.
    pub transcript: Vec<ChatMessage>,
    /// Model that produced the answer.
    pub model: String,
    /// Model round trips made.
    pub iterations: usize,
    /// Token usage summed over all round trips.
    pub usage: TokenUsage,
    /// Whether the iteration budget ran out before a final answer.
    pub exhausted: bool,
}

/// What the loop does after a model response.
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    /// The model answered; the exchange ends.
    FinalAnswer {
        /// Answer text, empty if the model sent none.
        answer: String,
    },
    /// The model requested function calls.
    ToolCalls {
        /// Calls in issued order.
        calls: Vec<ToolCall>,
    },
}

impl NextStep {
    /// Classify an assistant message.
    #[must_use]
    pub fn classify(message: &ChatMessage) -> Self {
        if message.has_tool_calls() {
            Self::ToolCalls {
                calls: message.tool_calls.clone(),
            }
        } else {
            Self::FinalAnswer {
                answer: message.text_content().unwrap_or_default().to_owned(),
            }
        }
    }
}
