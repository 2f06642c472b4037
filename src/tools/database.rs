//! Database-level tools.
//!
//! `list_databases`, `use_database`, `get_current_database`,
//! `create_database` and `drop_database`. The latter three keep the
//! session's current database in step with the server.

use crate::db::statements;
use crate::db::{ConnectionManager, SessionContext};
use crate::error::DbResult;
use crate::tools::{ToolResponse, non_blank};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

fn default_true() -> bool {
    true
}

/// Input for the use_database tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UseDatabaseInput {
    /// Name of the database to select for this session
    pub database: String,
}

/// Input for the create_database tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateDatabaseInput {
    /// Name of the database to create
    pub database: String,
    /// Character set. Default: server configuration (utf8mb4)
    #[serde(default)]
    pub charset: Option<String>,
    /// Collation. Default: utf8mb4_unicode_ci for the default charset, otherwise the charset's own default
    #[serde(default)]
    pub collation: Option<String>,
    /// Add IF NOT EXISTS so an existing database is not an error. Default: true
    #[serde(default = "default_true")]
    pub if_not_exists: bool,
}

/// Input for the drop_database tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DropDatabaseInput {
    /// Name of the database to drop. All of its tables are deleted.
    pub database: String,
    /// Add IF EXISTS so a missing database is not an error. Default: true
    #[serde(default = "default_true")]
    pub if_exists: bool,
}

/// Output for get_current_database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentDatabase {
    /// Selected database, or null when none is selected
    pub database: Option<String>,
}

/// Handler for database-level tools.
#[derive(Debug, Clone)]
pub struct DatabaseToolHandler {
    manager: Arc<ConnectionManager>,
    session: Arc<SessionContext>,
}

impl DatabaseToolHandler {
    pub fn new(manager: Arc<ConnectionManager>, session: Arc<SessionContext>) -> Self {
        Self { manager, session }
    }

    pub async fn list_databases(&self) -> DbResult<ToolResponse> {
        let mut conn = self.manager.acquire_unscoped().await?;
        let result = conn.run(&statements::show_databases()).await?;
        info!(count = result.row_count(), "Listed databases");
        Ok(ToolResponse::rows(result.rows))
    }

    /// Select a database for the rest of the session.
    ///
    /// Borrows an unaligned connection so a session whose current database
    /// was dropped elsewhere can still switch away from it.
    pub async fn use_database(&self, input: UseDatabaseInput) -> DbResult<ToolResponse> {
        let database = statements::require_identifier(&input.database, "Database")?;

        let mut conn = self.manager.acquire_unscoped().await?;
        conn.use_database(database).await?;
        self.session
            .set_current_database(Some(database.to_string()))
            .await;

        info!(database = %database, "Switched database");
        Ok(ToolResponse::text(format!(
            "Switched to database '{}'",
            database
        )))
    }

    /// Ask the server which database is selected and remember the answer.
    pub async fn get_current_database(&self) -> DbResult<ToolResponse> {
        let mut conn = self.manager.acquire(&self.session).await?;
        let database = conn.server_database().await?;

        self.session.set_current_database(database.clone()).await;
        ToolResponse::json(&CurrentDatabase { database })
    }

    pub async fn create_database(&self, input: CreateDatabaseInput) -> DbResult<ToolResponse> {
        let defaults = self.manager.ddl_defaults();
        let charset = non_blank(input.charset.as_deref());
        let collation = match (non_blank(input.collation.as_deref()), charset) {
            (Some(collation), _) => Some(collation),
            (None, None) => Some(defaults.collation.as_str()),
            (None, Some(cs)) if cs.eq_ignore_ascii_case(&defaults.charset) => {
                Some(defaults.collation.as_str())
            }
            (None, Some(_)) => None,
        };
        let charset = charset.unwrap_or(&defaults.charset);

        let sql = statements::create_database(
            &input.database,
            input.if_not_exists,
            charset,
            collation,
        )?;
        let database = input.database.trim();

        let mut conn = self.manager.acquire_unscoped().await?;
        conn.run(&sql).await?;

        info!(database = %database, charset = %charset, "Created database");
        Ok(ToolResponse::text(format!(
            "Database '{}' created (character set {})",
            database, charset
        )))
    }

    pub async fn drop_database(&self, input: DropDatabaseInput) -> DbResult<ToolResponse> {
        let sql = statements::drop_database(&input.database, input.if_exists)?;
        let database = input.database.trim();

        let mut conn = self.manager.acquire_unscoped().await?;
        conn.run(&sql).await?;

        let cleared = self.session.clear_if_current(database).await;
        info!(database = %database, cleared_current = cleared, "Dropped database");

        let mut message = format!("Database '{}' dropped", database);
        if cleared {
            message.push_str("; no database is selected now");
        }
        Ok(ToolResponse::text(message))
    }
}
