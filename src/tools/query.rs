//! Ad hoc SQL tools.
//!
//! `read_query` runs statements that pass the read-only check in
//! [`sql_validator`](crate::tools::sql_validator); `write_query` runs anything.
//! Both pass the SQL text to the server verbatim and can run it in another
//! database, switching back on the same connection afterwards.

use crate::db::statements;
use crate::db::{ConnectionManager, SessionContext};
use crate::error::{DbError, DbResult};
use crate::models::QueryResult;
use crate::tools::format::{OutputFormat, format_as_markdown, format_as_table};
use crate::tools::{ToolResponse, sql_validator};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Default value for decode_binary field.
fn default_decode_binary() -> bool {
    true
}

/// Input for the read_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadQueryInput {
    /// SQL to run. Must start with SELECT, SHOW, DESCRIBE, DESC, EXPLAIN or WITH. Sent to the server verbatim.
    pub sql: String,
    /// Run in this database, then switch back to the session's current database
    #[serde(default)]
    pub database: Option<String>,
    /// Output format: "json" returns rows as objects, "table" an ASCII table, "markdown" a markdown table
    #[serde(default)]
    pub format: OutputFormat,
    /// If true (default), show binary columns as UTF-8 text when valid (fallback to base64). If false, always use base64.
    #[serde(default = "default_decode_binary")]
    pub decode_binary: bool,
}

/// Input for the write_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WriteQueryInput {
    /// SQL to run (INSERT, UPDATE, DELETE, DDL, ...). Sent to the server verbatim: the caller is responsible for its safety.
    pub sql: String,
    /// Run in this database, then switch back to the session's current database
    #[serde(default)]
    pub database: Option<String>,
}

/// Handler for read_query and write_query.
#[derive(Debug, Clone)]
pub struct QueryToolHandler {
    manager: Arc<ConnectionManager>,
    session: Arc<SessionContext>,
}

impl QueryToolHandler {
    pub fn new(manager: Arc<ConnectionManager>, session: Arc<SessionContext>) -> Self {
        Self { manager, session }
    }

    /// Run a read-only statement. Rejected statements never reach the pool.
    pub async fn read_query(&self, input: ReadQueryInput) -> DbResult<ToolResponse> {
        sql_validator::validate_readonly(&input.sql)?;
        let target = statements::optional_identifier(input.database.as_deref(), "Database")?;

        let mut conn = self.manager.acquire(&self.session).await?;
        let result = conn
            .run_in_database(target, input.sql.trim(), input.decode_binary)
            .await?;

        info!(
            database = ?target,
            row_count = result.row_count(),
            execution_time_ms = result.execution_time_ms,
            "Read query executed"
        );

        Ok(render_rows(result, input.format))
    }

    /// Run any statement. Returns its rows if it produced a result set,
    /// otherwise the affected-row count and last insert id.
    pub async fn write_query(&self, input: WriteQueryInput) -> DbResult<ToolResponse> {
        let sql = input.sql.trim();
        if sql.is_empty() {
            return Err(DbError::invalid_input("SQL statement cannot be empty"));
        }
        let target = statements::optional_identifier(input.database.as_deref(), "Database")?;

        let mut conn = self.manager.acquire(&self.session).await?;
        let result = conn.run_in_database(target, sql, true).await?;

        info!(
            database = ?target,
            rows_affected = result.rows_affected,
            row_count = result.row_count(),
            execution_time_ms = result.execution_time_ms,
            "Write query executed"
        );

        if result.has_rows() {
            Ok(ToolResponse::rows(result.rows))
        } else {
            ToolResponse::json(&result.write_summary())
        }
    }
}

fn render_rows(result: QueryResult, format: OutputFormat) -> ToolResponse {
    match format {
        OutputFormat::Json => ToolResponse::rows(result.rows),
        OutputFormat::Table => ToolResponse::text(format_as_table(&result)),
        OutputFormat::Markdown => ToolResponse::text(format_as_markdown(&result)),
    }
}
