//! Output formatting for tabular tool results.
//!
//! JSON is the default. `table` mimics the mysql command-line client and
//! `markdown` renders a GitHub-style table.

use crate::models::QueryResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use unicode_width::UnicodeWidthStr;

/// Output format for read_query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON array of row objects (default)
    #[default]
    Json,
    /// ASCII table format (like the mysql CLI)
    Table,
    /// Markdown table format
    Markdown,
}

pub fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Column names of a result, in order.
fn column_names(result: &QueryResult) -> Vec<&str> {
    if !result.columns.is_empty() {
        return result.columns.iter().map(|c| c.name.as_str()).collect();
    }
    result
        .rows
        .first()
        .map(|row| row.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

fn cell(result_row: &serde_json::Map<String, JsonValue>, column: &str) -> (String, bool) {
    match result_row.get(column) {
        Some(value) => (format_value(value), value.is_number()),
        None => ("NULL".to_string(), false),
    }
}

/// Pad by display width so wide characters line up.
fn pad(text: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    if right_align {
        format!("{}{}", fill, text)
    } else {
        format!("{}{}", text, fill)
    }
}

/// "1 row", "2 rows".
fn row_count_text(count: usize) -> String {
    format!("{} {}", count, if count == 1 { "row" } else { "rows" })
}

pub fn format_as_table(result: &QueryResult) -> String {
    let columns = column_names(result);
    if columns.is_empty() {
        return format!(
            "Empty set ({:.2} sec)\n",
            result.execution_time_ms as f64 / 1000.0
        );
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.width()).collect();
    for row in &result.rows {
        for (i, col) in columns.iter().enumerate() {
            widths[i] = widths[i].max(cell(row, col).0.width());
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+\n";

    let mut output = String::new();
    output.push_str(&separator);
    for (col, w) in columns.iter().zip(&widths) {
        output.push_str(&format!("| {} ", pad(col, *w, false)));
    }
    output.push_str("|\n");
    output.push_str(&separator);

    for row in &result.rows {
        for (col, w) in columns.iter().zip(&widths) {
            let (text, numeric) = cell(row, col);
            output.push_str(&format!("| {} ", pad(&text, *w, numeric)));
        }
        output.push_str("|\n");
    }
    output.push_str(&separator);

    output.push_str(&format!(
        "{} in set ({:.2} sec)\n",
        row_count_text(result.row_count()),
        result.execution_time_ms as f64 / 1000.0
    ));

    output
}

fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

pub fn format_as_markdown(result: &QueryResult) -> String {
    let columns = column_names(result);
    if columns.is_empty() {
        return "*Empty set*".to_string();
    }

    let mut output = String::new();
    for col in &columns {
        output.push_str(&format!("| {} ", escape_markdown(col)));
    }
    output.push_str("|\n");
    output.push_str(&"|---".repeat(columns.len()));
    output.push_str("|\n");

    for row in &result.rows {
        for col in &columns {
            output.push_str(&format!("| {} ", escape_markdown(&cell(row, col).0)));
        }
        output.push_str("|\n");
    }

    output.push_str(&format!("\n*{}*", row_count_text(result.row_count())));
    output
}
