//! Plain-text rendering of query results and pipeline reports.
//!
//! Tables are tab-separated: one header line with the column names of the
//! first record, then one line per record. Values longer than the cell width
//! are cut and end in `...`.

use crate::db::{Record, Value};

/// Output for an empty result set.
pub const NO_RESULTS: &str = "No results returned.";

/// Default maximum cell width.
pub const DEFAULT_MAX_CELL_WIDTH: usize = 50;

/// Smallest usable cell width; room for the ellipsis.
pub const MIN_CELL_WIDTH: usize = 3;

const ELLIPSIS: &str = "...";
const COLUMN_SEPARATOR: &str = "\t";

/// Renders records as a tab-separated table.
///
/// Columns are taken from the first record. Later records are looked up by
/// those names; a missing or null value renders as `NULL`.
pub fn format_table(records: &[Record], max_width: usize) -> String {
    let Some(first) = records.first() else {
        return NO_RESULTS.to_string();
    };

    let columns: Vec<&str> = first.columns().collect();
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(columns.join(COLUMN_SEPARATOR));

    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| format_value(record.get(column), max_width))
            .collect();
        lines.push(cells.join(COLUMN_SEPARATOR));
    }

    lines.join("\n")
}

/// Renders one cell, truncated to at most `max(max_width, 3)` characters.
pub fn format_value(value: Option<&Value>, max_width: usize) -> String {
    let text = value.map_or_else(|| "NULL".to_string(), Value::to_display_string);
    truncate(text, max_width.max(MIN_CELL_WIDTH))
}

fn truncate(text: String, width: usize) -> String {
    if text.chars().count() <= width {
        return text;
    }
    let kept: String = text.chars().take(width - ELLIPSIS.len()).collect();
    format!("{kept}{ELLIPSIS}")
}

/// Renders the full answer to one question.
///
/// A non-empty `error` replaces the whole report with a labeled error block;
/// `sql` and `records` are then ignored.
pub fn format_report(
    question: &str,
    sql: &str,
    records: &[Record],
    error: Option<&str>,
    max_width: usize,
) -> String {
    if let Some(error) = error.filter(|e| !e.is_empty()) {
        return format!("\nError:\n{error}\n");
    }

    format!(
        "\nUser Question:\n{question}\n\nGenerated SQL:\n{sql}\n\nQuery Results:\n{}\n",
        format_table(records, max_width)
    )
}

/// One-line error status, optionally tagged with where it happened.
pub fn format_error(error: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("❌ Error ({context}): {error}"),
        None => format!("❌ Error: {error}"),
    }
}

/// One-line success status, optionally with a result count.
pub fn format_success(message: &str, count: Option<usize>) -> String {
    match count {
        Some(count) => format!("✅ {message} ({count} results)"),
        None => format!("✅ {message}"),
    }
}
