//! Common imports.

pub use crate::agent::{Analyst, AnalystConfig, ChatOutcome, FunctionCallRecord};
pub use crate::config::Settings;
pub use crate::error::{Error, LlmError, Result, ToolError};
pub use crate::message::{ChatMessage, MessageRole, ToolCall};
pub use crate::providers::openai::OpenAIClient;
pub use crate::providers::{GenerateOptions, MockModel, Model, ModelResponse};
pub use crate::store::{DataStore, ImportSummary, TableImport};
pub use crate::tool::{Dispatcher, Tool, ToolRegistry};
pub use crate::tools::database_registry;
