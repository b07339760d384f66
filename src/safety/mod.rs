//! Query safety gate.
//!
//! A conservative keyword filter: any statement whose text contains a
//! destructive verb anywhere is rejected. There is no tokenizer, so a
//! harmless `SELECT` that mentions one of the verbs inside a literal or an
//! identifier (`'UPDATE'`, `last_updated`, `dropped_at`) is rejected too.
//! Over-blocking is accepted; under-blocking is not.

use crate::error::{AskError, Result};

/// Operation keywords that mark a statement as unsafe.
pub const DANGEROUS_OPERATIONS: [&str; 5] = ["DROP", "DELETE", "UPDATE", "TRUNCATE", "ALTER"];

/// Message attached to every rejection.
pub const UNSAFE_QUERY_MESSAGE: &str =
    "Query contains potentially dangerous operations. Only SELECT queries are allowed by default.";

/// Returns the first denylisted keyword found in `sql`, case-insensitively.
pub fn blocked_keyword(sql: &str) -> Option<&'static str> {
    let normalized = sql.trim().to_uppercase();
    DANGEROUS_OPERATIONS
        .iter()
        .copied()
        .find(|keyword| normalized.contains(keyword))
}

/// Returns true if no denylisted keyword occurs anywhere in `sql`.
pub fn is_safe(sql: &str) -> bool {
    blocked_keyword(sql).is_none()
}

/// Fails with `AskError::UnsafeQuery` when `sql` is not safe.
pub fn check(sql: &str) -> Result<()> {
    match blocked_keyword(sql) {
        None => Ok(()),
        Some(keyword) => Err(AskError::unsafe_query(format!(
            "{UNSAFE_QUERY_MESSAGE} (blocked keyword: {keyword})"
        ))),
    }
}
