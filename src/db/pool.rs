//! Connection pool management.
//!
//! One bounded MySQL pool serves every session. Connections are opened lazily
//! and borrowed per tool call through `SessionConnection`.

use crate::config::{Config, DdlDefaults};
use crate::db::executor::QueryExecutor;
use crate::db::session::{SessionConnection, SessionContext};
use crate::error::{DbError, DbResult};
use sqlx::{Connection, MySqlPool};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ConnectionManager {
    pool: MySqlPool,
    executor: QueryExecutor,
    default_database: Option<String>,
    ddl_defaults: DdlDefaults,
    server_addr: String,
}

impl ConnectionManager {
    /// Build the pool from configuration. No connection is opened until first use.
    pub fn new(config: &Config) -> Self {
        info!(
            server = %config.server_addr(),
            user = %config.user,
            database = ?config.default_database(),
            max_connections = config.max_connections,
            "Creating MySQL connection pool"
        );

        let pool = config
            .pool_options()
            .connect_lazy_with(config.connect_options());

        Self {
            pool,
            executor: QueryExecutor::with_timeout(config.query_timeout_duration()),
            default_database: config.default_database(),
            ddl_defaults: config.ddl_defaults(),
            server_addr: config.server_addr(),
        }
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool, default_database: Option<String>, query_timeout: Duration) -> Self {
        Self {
            pool,
            executor: QueryExecutor::with_timeout(query_timeout),
            default_database,
            ddl_defaults: DdlDefaults::default(),
            server_addr: String::new(),
        }
    }

    pub fn with_ddl_defaults(mut self, ddl_defaults: DdlDefaults) -> Self {
        self.ddl_defaults = ddl_defaults;
        self
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub fn ddl_defaults(&self) -> &DdlDefaults {
        &self.ddl_defaults
    }

    /// A fresh session starting at the configured default database.
    pub fn new_session(&self) -> SessionContext {
        SessionContext::new(self.default_database.clone())
    }

    /// Open one connection and ping it.
    pub async fn ping(&self) -> DbResult<()> {
        let mut conn = self.pool.acquire().await.map_err(|e| self.connect_error(e))?;
        conn.ping().await.map_err(|e| self.connect_error(e))?;
        debug!(server = %self.server_addr, "MySQL ping succeeded");
        Ok(())
    }

    /// Borrow a connection with the session's database selected.
    ///
    /// A session without a database gets a connection with none selected.
    pub async fn acquire(&self, session: &SessionContext) -> DbResult<SessionConnection> {
        match session.current_database().await {
            Some(db) => {
                let mut conn = self.acquire_unscoped().await?;
                conn.use_database(&db).await?;
                Ok(conn)
            }
            None => self.acquire_without_database().await,
        }
    }

    /// Borrow a connection that has no database selected.
    ///
    /// MySQL cannot deselect a database, so pooled connections still on one
    /// from an earlier call are closed until a clean or newly opened one
    /// turns up.
    async fn acquire_without_database(&self) -> DbResult<SessionConnection> {
        let attempts = self.pool.options().get_max_connections() + 1;
        for _ in 0..attempts {
            let mut conn = self.acquire_unscoped().await?;
            match conn.server_database().await? {
                None => return Ok(conn),
                Some(stale) => {
                    debug!(database = %stale, "Closing pooled connection left on a database");
                    conn.discard();
                }
            }
        }
        Err(DbError::internal(
            "Could not borrow a connection without a selected database",
        ))
    }

    /// Borrow a connection without touching its database selection.
    pub async fn acquire_unscoped(&self) -> DbResult<SessionConnection> {
        let conn = self.pool.acquire().await.map_err(|e| self.connect_error(e))?;
        Ok(SessionConnection::new(conn, self.executor))
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("MySQL connection pool closed");
    }

    fn connect_error(&self, error: sqlx::Error) -> DbError {
        match error {
            sqlx::Error::Database(_) => DbError::from(error),
            sqlx::Error::PoolTimedOut => DbError::timeout(
                "connection pool acquire",
                self.pool.options().get_acquire_timeout().as_secs(),
            ),
            other => DbError::connection(
                format!("Failed to connect to MySQL at {}: {}", self.server_addr, other),
                connection_suggestion(&other),
            ),
        }
    }
}

/// Generate a helpful suggestion for connection errors.
fn connection_suggestion(error: &sqlx::Error) -> &'static str {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") {
        return "Check that the MySQL server is running and MYSQL_HOST/MYSQL_PORT are correct";
    }
    if error_str.contains("timed out") {
        return "The server did not answer in time; check network access or raise MYSQL_CONNECT_TIMEOUT";
    }
    if error_str.contains("tls") || error_str.contains("ssl") {
        return "Check the server's TLS configuration";
    }
    "Verify MYSQL_HOST, MYSQL_PORT, MYSQL_USER and MYSQL_PASSWORD"
}
