//! MCP tool implementations.
//!
//! This module contains all MySQL tool handlers:
//! - `database`: list/select/create/drop databases
//! - `schema`: list, describe, create, alter and drop tables
//! - `query`: read-only and write SQL, optionally in another database
//! - `admin`: server summary, users and process list
//! - `sql_validator`: read-only enforcement for `read_query`
//! - `format`: table and markdown rendering

pub mod admin;
pub mod database;
pub mod format;
pub mod query;
pub mod schema;
pub mod sql_validator;

pub use admin::{AdminToolHandler, DatabaseInfo, InstanceInfo};
pub use database::{
    CreateDatabaseInput, CurrentDatabase, DatabaseToolHandler, DropDatabaseInput,
    UseDatabaseInput,
};
pub use format::OutputFormat;
pub use query::{QueryToolHandler, ReadQueryInput, WriteQueryInput};
pub use schema::{
    AlterTableInput, CreateTableInput, DropTableInput, ListTablesInput, SchemaToolHandler,
    TableInput,
};

use crate::error::{DbError, DbResult};
use crate::models::JsonRow;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Optional keyword argument with blank values treated as not given.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Successful outcome of a tool handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
    /// Structured payload, rendered as pretty-printed JSON.
    Json(JsonValue),
    /// Human-readable confirmation or pre-formatted text.
    Text(String),
}

impl ToolResponse {
    pub fn json<T: Serialize>(value: &T) -> DbResult<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| DbError::internal(format!("Failed to serialize result: {}", e)))
    }

    pub fn rows(rows: Vec<JsonRow>) -> Self {
        Self::Json(JsonValue::Array(
            rows.into_iter().map(JsonValue::Object).collect(),
        ))
    }

    pub fn text(message: impl Into<String>) -> Self {
        Self::Text(message.into())
    }

    /// Text sent back to the client.
    pub fn render(&self) -> String {
        match self {
            Self::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Text(text) => text.clone(),
        }
    }
}
