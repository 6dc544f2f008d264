//! Guardrails: safety checks applied to model-issued function calls.
//!
//! A guardrail inspects one argument before anything reaches the data store
//! and returns a [`GuardrailOutput`]. When the tripwire is triggered the call
//! is answered with the reason as a tool error and nothing is executed.
//!
//! The only guardrail today is [`SelectOnly`], which gates the SQL text of
//! `execute_select_query`.

mod query;

pub use query::{FORBIDDEN_KEYWORDS, SelectOnly, check_select_query};

/// The verdict of a guardrail check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailOutput {
    /// Whether the tripwire was triggered.
    pub tripwire_triggered: bool,

    /// Why the tripwire was triggered, in the words shown to the model.
    pub reason: Option<String>,
}

impl GuardrailOutput {
    /// A passing verdict.
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            tripwire_triggered: false,
            reason: None,
        }
    }

    /// A failing verdict carrying `reason`.
    #[must_use]
    pub fn tripwire(reason: impl Into<String>) -> Self {
        Self {
            tripwire_triggered: true,
            reason: Some(reason.into()),
        }
    }

    /// Returns `true` if the tripwire was triggered.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        self.tripwire_triggered
    }
}
