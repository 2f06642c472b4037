//! Query-related data models.
//!
//! This module defines types for SQL statement results.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A result row: column name to JSON value, in the column order of the result set.
pub type JsonRow = serde_json::Map<String, JsonValue>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    /// MySQL type name as reported by the driver (e.g., "BIGINT", "VARCHAR")
    pub type_name: String,
    pub nullable: bool,
}

impl ColumnMetadata {
    /// Create new column metadata.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable,
        }
    }
}

/// Everything a statement produced: its rows (if any) and the write counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<JsonRow>,
    pub rows_affected: u64,
    pub last_insert_id: u64,
    pub execution_time_ms: u64,
}

impl QueryResult {
    /// Create an empty result.
    pub fn empty(execution_time_ms: u64) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            rows_affected: 0,
            last_insert_id: 0,
            execution_time_ms,
        }
    }

    /// Get the number of rows in the result.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True if the statement returned at least one row.
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Descriptor for statements that changed data rather than returning it.
    pub fn write_summary(&self) -> WriteSummary {
        WriteSummary {
            affected_rows: self.rows_affected,
            last_insert_id: self.last_insert_id,
            execution_time_ms: self.execution_time_ms,
        }
    }

    /// Look up a string column in the first row.
    pub fn first_str(&self, column: &str) -> Option<&str> {
        self.rows.first()?.get(column)?.as_str()
    }
}

/// Result descriptor returned for writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub execution_time_ms: u64,
}
