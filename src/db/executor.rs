//! Statement execution engine.
//!
//! This module runs SQL text on a single MySQL connection with:
//! - Text-protocol execution (`USE`, DDL and multi-statement text all work)
//! - Statement timeouts
//! - Collection of both result rows and write counters
//!
//! Statements are never prepared: the SQL string goes to the server as-is.

use crate::config::DEFAULT_QUERY_TIMEOUT_SECS;
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::QueryResult;
use futures_util::TryStreamExt;
use sqlx::Either;
use sqlx::mysql::{MySqlConnection, MySqlRow};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

/// Runs statements on a borrowed connection.
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor {
    default_timeout: Duration,
}

impl QueryExecutor {
    /// Create a new query executor with default settings.
    pub fn new() -> Self {
        Self {
            default_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
        }
    }

    /// Create a new query executor with a custom statement timeout.
    pub fn with_timeout(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Execute one SQL text and return its rows and write counters.
    pub async fn run(
        &self,
        conn: &mut MySqlConnection,
        sql: &str,
        decode_binary: bool,
    ) -> DbResult<QueryResult> {
        let start = Instant::now();

        debug!(
            sql = %sql,
            timeout_secs = self.default_timeout.as_secs(),
            "Executing statement"
        );

        let collect = async {
            let mut stream = sqlx::raw_sql(sql).fetch_many(&mut *conn);
            let mut rows: Vec<MySqlRow> = Vec::new();
            let mut rows_affected = 0u64;
            let mut last_insert_id = 0u64;

            while let Some(item) = stream.try_next().await? {
                match item {
                    Either::Left(done) => {
                        rows_affected += done.rows_affected();
                        if done.last_insert_id() != 0 {
                            last_insert_id = done.last_insert_id();
                        }
                    }
                    Either::Right(row) => rows.push(row),
                }
            }

            Ok::<_, sqlx::Error>((rows, rows_affected, last_insert_id))
        };

        match timeout(self.default_timeout, collect).await {
            Ok(Ok((rows, rows_affected, last_insert_id))) => Ok(process_rows(
                rows,
                rows_affected,
                last_insert_id,
                start,
                decode_binary,
            )),
            Ok(Err(e)) => Err(DbError::from(e)),
            Err(_) => Err(timeout_error("statement execution", self.default_timeout)),
        }
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn driver rows into a QueryResult.
fn process_rows<R: RowToJson>(
    rows: Vec<R>,
    rows_affected: u64,
    last_insert_id: u64,
    start: Instant,
    decode_binary: bool,
) -> QueryResult {
    let execution_time_ms = start.elapsed().as_millis() as u64;

    let columns = rows
        .first()
        .map(|r| r.get_column_metadata())
        .unwrap_or_default();

    let json_rows = rows
        .iter()
        .map(|r| r.to_json_map_with_options(decode_binary))
        .collect();

    QueryResult {
        columns,
        rows: json_rows,
        rows_affected,
        last_insert_id,
        execution_time_ms,
    }
}

fn timeout_error(operation: &str, timeout: Duration) -> DbError {
    DbError::timeout(operation, timeout.as_secs())
}
