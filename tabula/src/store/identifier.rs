//! Identifier allow-list.
//!
//! Table names are the only thing ever interpolated into SQL text. They must
//! pass [`validate_identifier`] first and are then double-quoted by
//! [`quote_identifier`]; every value-position argument is a bound parameter.

use super::error::{StoreError, StoreResult};

/// Longest accepted identifier.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Check a table name against `[A-Za-z0-9_]{1,64}`.
///
/// # Errors
///
/// Returns [`StoreError::InvalidIdentifier`] for anything else.
pub fn validate_identifier(name: &str) -> StoreResult<&str> {
    let ok = !name.is_empty()
        && name.len() <= MAX_IDENTIFIER_LEN
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if ok {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_owned()))
    }
}

/// Validate and double-quote a table name for interpolation.
///
/// # Errors
///
/// Returns [`StoreError::InvalidIdentifier`] if validation fails.
pub fn quote_identifier(name: &str) -> StoreResult<String> {
    validate_identifier(name).map(|n| format!("\"{n}\""))
}
