//! Table-level tools.
//!
//! This module implements `list_tables`, `describe_table`,
//! `show_create_table`, `create_table`, `alter_table` and `drop_table`.
//! Every statement names its database explicitly when one is given, so no
//! temporary `USE` is needed here.

use crate::db::statements::{self, AlterAction, CreateTable};
use crate::db::{ConnectionManager, SessionContext};
use crate::error::DbResult;
use crate::tools::{ToolResponse, non_blank};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

fn default_true() -> bool {
    true
}

/// Input for the list_tables tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTablesInput {
    /// Database to list. Default: the session's current database
    #[serde(default)]
    pub database: Option<String>,
}

/// Input for describe_table and show_create_table.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TableInput {
    /// Table name
    pub table: String,
    /// Database containing the table. Default: the session's current database
    #[serde(default)]
    pub database: Option<String>,
}

/// Input for the create_table tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateTableInput {
    /// Table name
    pub table: String,
    /// Column definitions as raw SQL, e.g. "id INT PRIMARY KEY, name VARCHAR(50)". Inserted verbatim: the caller is responsible for its safety.
    pub columns: String,
    /// Database to create the table in. Default: the session's current database
    #[serde(default)]
    pub database: Option<String>,
    /// Storage engine. Default: InnoDB
    #[serde(default)]
    pub engine: Option<String>,
    /// Default character set. Default: utf8mb4
    #[serde(default)]
    pub charset: Option<String>,
    /// Add IF NOT EXISTS. Default: true
    #[serde(default = "default_true")]
    pub if_not_exists: bool,
}

/// Input for the alter_table tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AlterTableInput {
    /// Table name
    pub table: String,
    /// Column operation: ADD, MODIFY, CHANGE or DROP
    pub action: AlterAction,
    /// Column specification as raw SQL, e.g. "email VARCHAR(255) NOT NULL" (for DROP, just the column name). Inserted verbatim.
    pub column_spec: String,
    /// Optional raw position clause, e.g. "AFTER name" or "FIRST"
    #[serde(default)]
    pub position: Option<String>,
    /// Database containing the table. Default: the session's current database
    #[serde(default)]
    pub database: Option<String>,
}

/// Input for the drop_table tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DropTableInput {
    /// Table name
    pub table: String,
    /// Database containing the table. Default: the session's current database
    #[serde(default)]
    pub database: Option<String>,
    /// Add IF EXISTS. Default: true
    #[serde(default = "default_true")]
    pub if_exists: bool,
}

/// Human-readable `db.table` (or just `table`) for messages and logs.
fn display_name(database: Option<&str>, table: &str) -> String {
    match database.map(str::trim).filter(|db| !db.is_empty()) {
        Some(db) => format!("{}.{}", db, table.trim()),
        None => table.trim().to_string(),
    }
}

/// Blank engine or charset arguments fall back to the configured default.
fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    non_blank(value).unwrap_or(default)
}

/// Handler for table-level tools.
#[derive(Debug, Clone)]
pub struct SchemaToolHandler {
    manager: Arc<ConnectionManager>,
    session: Arc<SessionContext>,
}

impl SchemaToolHandler {
    pub fn new(manager: Arc<ConnectionManager>, session: Arc<SessionContext>) -> Self {
        Self { manager, session }
    }

    pub async fn list_tables(&self, input: ListTablesInput) -> DbResult<ToolResponse> {
        let sql = statements::show_tables(input.database.as_deref())?;
        let mut conn = self.manager.acquire(&self.session).await?;
        let result = conn.run(&sql).await?;

        info!(
            database = ?input.database,
            count = result.row_count(),
            "Listed tables"
        );
        Ok(ToolResponse::rows(result.rows))
    }

    pub async fn describe_table(&self, input: TableInput) -> DbResult<ToolResponse> {
        let sql = statements::describe_table(input.database.as_deref(), &input.table)?;
        let mut conn = self.manager.acquire(&self.session).await?;
        let result = conn.run(&sql).await?;

        info!(
            table = %display_name(input.database.as_deref(), &input.table),
            columns = result.row_count(),
            "Described table"
        );
        Ok(ToolResponse::rows(result.rows))
    }

    pub async fn show_create_table(&self, input: TableInput) -> DbResult<ToolResponse> {
        let sql = statements::show_create_table(input.database.as_deref(), &input.table)?;
        let mut conn = self.manager.acquire(&self.session).await?;
        let result = conn.run(&sql).await?;
        Ok(ToolResponse::rows(result.rows))
    }

    pub async fn create_table(&self, input: CreateTableInput) -> DbResult<ToolResponse> {
        let defaults = self.manager.ddl_defaults();
        let spec = CreateTable {
            database: input.database.as_deref(),
            table: &input.table,
            columns: &input.columns,
            if_not_exists: input.if_not_exists,
            engine: or_default(input.engine.as_deref(), &defaults.engine),
            charset: or_default(input.charset.as_deref(), &defaults.charset),
        };
        let sql = statements::create_table(&spec)?;

        let mut conn = self.manager.acquire(&self.session).await?;
        conn.run(&sql).await?;

        let name = display_name(input.database.as_deref(), &input.table);
        info!(table = %name, "Created table");
        Ok(ToolResponse::text(format!("Table '{}' created", name)))
    }

    pub async fn alter_table(&self, input: AlterTableInput) -> DbResult<ToolResponse> {
        let sql = statements::alter_table(
            input.database.as_deref(),
            &input.table,
            input.action,
            &input.column_spec,
            input.position.as_deref(),
        )?;

        let mut conn = self.manager.acquire(&self.session).await?;
        conn.run(&sql).await?;

        let name = display_name(input.database.as_deref(), &input.table);
        info!(table = %name, action = %input.action, "Altered table");
        Ok(ToolResponse::text(format!(
            "Table '{}' altered ({} COLUMN)",
            name, input.action
        )))
    }

    pub async fn drop_table(&self, input: DropTableInput) -> DbResult<ToolResponse> {
        let sql = statements::drop_table(input.database.as_deref(), &input.table, input.if_exists)?;

        let mut conn = self.manager.acquire(&self.session).await?;
        conn.run(&sql).await?;

        let name = display_name(input.database.as_deref(), &input.table);
        info!(table = %name, "Dropped table");
        Ok(ToolResponse::text(format!("Table '{}' dropped", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DdlDefaults;

    #[test]
    fn test_create_table_input_defaults() {
        let input: CreateTableInput = serde_json::from_str(
            r#"{"table": "t1", "columns": "id INT PRIMARY KEY, name VARCHAR(50)"}"#,
        )
        .unwrap();
        assert!(input.if_not_exists);
        assert!(input.engine.is_none());
        assert!(input.database.is_none());
    }

    #[test]
    fn test_alter_table_input_action() {
        let input: AlterTableInput = serde_json::from_str(
            r#"{"table": "t1", "action": "add", "column_spec": "email VARCHAR(255)", "position": "AFTER name"}"#,
        )
        .unwrap();
        assert_eq!(input.action, AlterAction::Add);
        assert_eq!(input.position.as_deref(), Some("AFTER name"));

        let bad: Result<AlterTableInput, _> = serde_json::from_str(
            r#"{"table": "t1", "action": "RENAME", "column_spec": "x"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_drop_table_input_defaults() {
        let input: DropTableInput = serde_json::from_str(r#"{"table": "t1"}"#).unwrap();
        assert!(input.if_exists);
    }

    #[test]
    fn test_blank_table_options_use_defaults() {
        let defaults = DdlDefaults::default();
        assert_eq!(or_default(Some(""), &defaults.engine), "InnoDB");
        assert_eq!(or_default(Some("   "), &defaults.charset), "utf8mb4");
        assert_eq!(or_default(None, &defaults.engine), "InnoDB");
        assert_eq!(or_default(Some(" MyISAM "), &defaults.engine), "MyISAM");

        let sql = statements::create_table(&CreateTable {
            database: None,
            table: "t1",
            columns: "id INT",
            if_not_exists: true,
            engine: or_default(Some(""), &defaults.engine),
            charset: or_default(Some(" "), &defaults.charset),
        })
        .unwrap();
        assert!(sql.ends_with("ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Some("sales"), "orders"), "sales.orders");
        assert_eq!(display_name(Some("  "), "orders"), "orders");
        assert_eq!(display_name(None, " orders "), "orders");
    }
}
