//! Response cleanup for LLM outputs.
//!
//! Models often wrap the statement in a markdown fence. Only a fence at the
//! very start and one at the very end are removed; nothing else about the
//! text is interpreted.

/// Opening fence tagged as SQL.
const FENCE_SQL_START: &str = "```sql";

/// Untagged opening fence.
const FENCE_START: &str = "```";

/// Closing fence.
const FENCE_END: &str = "```";

/// Strips a leading and a trailing markdown fence and surrounding whitespace.
pub fn clean_sql_response(response: &str) -> String {
    let mut sql = response.trim();

    if let Some(rest) = sql.strip_prefix(FENCE_SQL_START) {
        sql = rest;
    } else if let Some(rest) = sql.strip_prefix(FENCE_START) {
        sql = rest;
    }

    if let Some(rest) = sql.strip_suffix(FENCE_END) {
        sql = rest;
    }

    sql.trim().to_string()
}
