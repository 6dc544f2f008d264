//! Read-only SQL gate.
//!
//! This is a textual filter, not a parser. It accepts text that starts with
//! `SELECT` and contains none of [`FORBIDDEN_KEYWORDS`] as a whole word,
//! case-insensitively. Known limitations:
//!
//! - a forbidden word inside a string literal or identifier still rejects
//!   (`WHERE note = 'please delete'`);
//! - comments, `WITH` prefixes and encoding tricks are not understood.
//!
//! The data store adds a second layer: it only steps statements SQLite itself
//! reports as read-only.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use super::GuardrailOutput;
use crate::error::ToolError;

/// Keywords that reject a query wherever they appear as a whole word.
pub const FORBIDDEN_KEYWORDS: [&str; 7] = [
    "DROP", "DELETE", "INSERT", "UPDATE", "ALTER", "CREATE", "TRUNCATE",
];

fn forbidden_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(r"(?i)\b({})\b", FORBIDDEN_KEYWORDS.join("|"))).expect("valid regex")
    })
}

/// Guardrail admitting single `SELECT` statements only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectOnly;

impl SelectOnly {
    /// Inspect `query` without executing it.
    #[must_use]
    pub fn check(self, query: &str) -> GuardrailOutput {
        let normalized = query.trim().to_uppercase();
        if !normalized.starts_with("SELECT") {
            return GuardrailOutput::tripwire("Only SELECT queries are allowed");
        }
        forbidden_pattern()
            .captures(&normalized)
            .and_then(|caps| caps.get(1))
            .map_or_else(GuardrailOutput::pass, |keyword| {
                GuardrailOutput::tripwire(format!(
                    "Query contains forbidden keyword: {}",
                    keyword.as_str()
                ))
            })
    }
}

/// Run [`SelectOnly`] over `query`.
///
/// # Errors
///
/// Returns [`ToolError::QueryRejected`] carrying the reason when the gate trips.
pub fn check_select_query(query: &str) -> Result<(), ToolError> {
    let verdict = SelectOnly.check(query);
    let triggered = verdict.is_triggered();
    match verdict.reason {
        Some(reason) if triggered => {
            warn!(%reason, "Rejected query");
            Err(ToolError::rejected(reason))
        }
        _ => Ok(()),
    }
}
