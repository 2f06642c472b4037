//! Per-session database selection and session-pinned connections.
//!
//! A `SessionContext` remembers which database an MCP session has selected.
//! A `SessionConnection` is one pooled connection borrowed for the whole of a
//! tool call, so a temporary `USE` and its restore run on the same connection
//! as the statement between them.

use crate::db::executor::QueryExecutor;
use crate::db::statements;
use crate::error::{DbError, DbResult};
use crate::models::QueryResult;
use sqlx::MySql;
use sqlx::pool::PoolConnection;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// The database currently selected by one MCP session.
///
/// `None` means instance-wide mode: no database is selected.
#[derive(Debug, Default)]
pub struct SessionContext {
    current: RwLock<Option<String>>,
}

impl SessionContext {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    pub async fn current_database(&self) -> Option<String> {
        self.current.read().await.clone()
    }

    pub async fn set_current_database(&self, database: Option<String>) {
        let mut current = self.current.write().await;
        if *current != database {
            debug!(from = ?*current, to = ?database, "Session database changed");
        }
        *current = database;
    }

    /// Forget the selection if it names `database`. Returns true if it did.
    pub async fn clear_if_current(&self, database: &str) -> bool {
        let mut current = self.current.write().await;
        if current.as_deref() == Some(database) {
            *current = None;
            true
        } else {
            false
        }
    }
}

/// A pooled connection held for the duration of one tool call.
///
/// Dropping it returns the connection to the pool unless it was discarded,
/// in which case the physical connection is closed instead.
pub struct SessionConnection {
    conn: PoolConnection<MySql>,
    selected: Option<String>,
    executor: QueryExecutor,
    discarded: bool,
}

impl std::fmt::Debug for SessionConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConnection")
            .field("selected", &self.selected)
            .field("executor", &self.executor)
            .field("discarded", &self.discarded)
            .finish_non_exhaustive()
    }
}

impl SessionConnection {
    pub(crate) fn new(conn: PoolConnection<MySql>, executor: QueryExecutor) -> Self {
        Self {
            conn,
            selected: None,
            executor,
            discarded: false,
        }
    }

    /// Database this connection was last switched to, if known.
    pub fn selected_database(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    /// Run SQL text, decoding binary columns as text where possible.
    pub async fn run(&mut self, sql: &str) -> DbResult<QueryResult> {
        self.run_with_options(sql, true).await
    }

    /// Run SQL text. A statement that times out leaves the connection in an
    /// unknown state, so it is discarded rather than returned to the pool.
    pub async fn run_with_options(&mut self, sql: &str, decode_binary: bool) -> DbResult<QueryResult> {
        let result = self.executor.run(&mut self.conn, sql, decode_binary).await;
        if let Err(DbError::Timeout { .. }) = &result {
            warn!("Statement timed out; closing its connection");
            self.discard();
        }
        result
    }

    /// Issue `USE` for `database` on this connection.
    pub async fn use_database(&mut self, database: &str) -> DbResult<()> {
        let database = statements::require_identifier(database, "Database")?;
        self.run(&statements::use_database(database)?).await?;
        self.selected = Some(database.to_string());
        Ok(())
    }

    /// Ask the server which database this connection has selected.
    pub async fn server_database(&mut self) -> DbResult<Option<String>> {
        let result = self.run(&statements::select_current_database()).await?;
        Ok(result.first_str("database").map(String::from))
    }

    /// Run `sql` with `database` selected, then switch back.
    ///
    /// With no target, or a target equal to the current selection, this is a
    /// plain `run`. Failing to switch to the target is an error; failing to
    /// switch back is logged and the connection is discarded, but the
    /// statement's own result is still returned.
    pub async fn run_in_database(
        &mut self,
        database: Option<&str>,
        sql: &str,
        decode_binary: bool,
    ) -> DbResult<QueryResult> {
        let target = match database {
            Some(target) if self.selected.as_deref() != Some(target) => target,
            _ => return self.run_with_options(sql, decode_binary).await,
        };

        let previous = self.selected.clone();
        self.use_database(target).await?;
        let result = self.run_with_options(sql, decode_binary).await;
        self.restore(previous.as_deref()).await;
        result
    }

    /// Switch back to `previous` after a temporary switch.
    ///
    /// MySQL cannot deselect a database, so with no previous selection the
    /// connection is discarded instead.
    pub async fn restore(&mut self, previous: Option<&str>) {
        if self.discarded {
            return;
        }
        match previous {
            Some(db) => {
                if let Err(e) = self.use_database(db).await {
                    warn!(
                        database = %db,
                        error = %e,
                        "Failed to restore previous database; closing connection"
                    );
                    self.discard();
                }
            }
            None => {
                debug!("No previous database to restore; closing connection");
                self.discard();
            }
        }
    }

    /// Close the underlying connection on drop instead of pooling it.
    pub fn discard(&mut self) {
        if !self.discarded {
            self.conn.close_on_drop();
            self.discarded = true;
        }
    }
}
