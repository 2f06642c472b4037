//! Server administration tools.
//!
//! `instance_info` and `database_info` merge several small read-only
//! statements into one summary; `list_users` and `show_processlist` return
//! rows as the server reports them.

use crate::db::statements;
use crate::db::{ConnectionManager, SessionConnection, SessionContext};
use crate::error::DbResult;
use crate::models::QueryResult;
use crate::tools::ToolResponse;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::info;

/// Summary returned by instance_info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceInfo {
    pub version: Option<String>,
    pub current_user: Option<String>,
    pub current_database: Option<String>,
    /// Threads_connected from global status
    pub connected_threads: Option<u64>,
    pub uptime_seconds: Option<u64>,
    /// Uptime as text, e.g. "2d 3h 4m 5s"
    pub uptime: Option<String>,
    /// Databases other than the system schemas
    pub user_databases: Option<u64>,
}

/// Summary returned by database_info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseInfo {
    pub version: Option<String>,
    pub current_user: Option<String>,
    pub current_database: Option<String>,
}

/// Format seconds as "Xd Xh Xm Xs", omitting leading zero units.
///
/// ```
/// use mysql_mcp_server::tools::admin::format_uptime;
///
/// assert_eq!(format_uptime(0), "0s");
/// assert_eq!(format_uptime(3661), "1h 1m 1s");
/// assert_eq!(format_uptime(90061), "1d 1h 1m 1s");
/// ```
pub fn format_uptime(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    let parts = [(days, "d"), (hours, "h"), (minutes, "m")];
    let mut out: Vec<String> = parts
        .iter()
        .skip_while(|(value, _)| *value == 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();
    out.push(format!("{}s", seconds));
    out.join(" ")
}

/// Read the numeric `Value` column of a `SHOW GLOBAL STATUS LIKE ...` result.
fn status_value(result: &QueryResult) -> Option<u64> {
    match result.rows.first()?.get("Value")? {
        JsonValue::String(s) => s.trim().parse().ok(),
        JsonValue::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn first_u64(result: &QueryResult, column: &str) -> Option<u64> {
    match result.rows.first()?.get(column)? {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Handler for server administration tools.
#[derive(Debug, Clone)]
pub struct AdminToolHandler {
    manager: Arc<ConnectionManager>,
    session: Arc<SessionContext>,
}

impl AdminToolHandler {
    pub fn new(manager: Arc<ConnectionManager>, session: Arc<SessionContext>) -> Self {
        Self { manager, session }
    }

    async fn basic_info(conn: &mut SessionConnection) -> DbResult<DatabaseInfo> {
        let version = conn.run(&statements::select_version()).await?;
        let user = conn.run(&statements::select_current_user()).await?;
        let database = conn.run(&statements::select_current_database()).await?;

        Ok(DatabaseInfo {
            version: version.first_str("version").map(String::from),
            current_user: user.first_str("user").map(String::from),
            current_database: database.first_str("database").map(String::from),
        })
    }

    pub async fn instance_info(&self) -> DbResult<ToolResponse> {
        let mut conn = self.manager.acquire(&self.session).await?;
        let basic = Self::basic_info(&mut conn).await?;

        let threads = conn
            .run(&statements::show_global_status("Threads_connected"))
            .await?;
        let uptime = conn.run(&statements::show_global_status("Uptime")).await?;
        let databases = conn.run(&statements::count_user_databases()).await?;

        let uptime_seconds = status_value(&uptime);
        let summary = InstanceInfo {
            version: basic.version,
            current_user: basic.current_user,
            current_database: basic.current_database,
            connected_threads: status_value(&threads),
            uptime_seconds,
            uptime: uptime_seconds.map(format_uptime),
            user_databases: first_u64(&databases, "count"),
        };

        info!(
            version = ?summary.version,
            connected_threads = ?summary.connected_threads,
            "Collected instance info"
        );
        ToolResponse::json(&summary)
    }

    pub async fn database_info(&self) -> DbResult<ToolResponse> {
        let mut conn = self.manager.acquire(&self.session).await?;
        let summary = Self::basic_info(&mut conn).await?;
        ToolResponse::json(&summary)
    }

    /// Requires SELECT on mysql.user; a privilege error is returned as is.
    pub async fn list_users(&self) -> DbResult<ToolResponse> {
        let mut conn = self.manager.acquire_unscoped().await?;
        let result = conn.run(&statements::list_users()).await?;
        info!(count = result.row_count(), "Listed users");
        Ok(ToolResponse::rows(result.rows))
    }

    pub async fn show_processlist(&self) -> DbResult<ToolResponse> {
        let mut conn = self.manager.acquire_unscoped().await?;
        let result = conn.run(&statements::show_processlist()).await?;
        Ok(ToolResponse::rows(result.rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn single_row(value: JsonValue) -> QueryResult {
        QueryResult {
            rows: vec![value.as_object().cloned().unwrap()],
            ..QueryResult::empty(0)
        }
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(59), "59s");
        assert_eq!(format_uptime(60), "1m 0s");
        assert_eq!(format_uptime(86_400), "1d 0h 0m 0s");
        assert_eq!(format_uptime(2 * 86_400 + 3 * 3_600 + 4 * 60 + 5), "2d 3h 4m 5s");
    }

    #[test]
    fn test_status_value() {
        let result = single_row(json!({"Variable_name": "Uptime", "Value": "12345"}));
        assert_eq!(status_value(&result), Some(12345));

        let result = single_row(json!({"Variable_name": "Uptime", "Value": "n/a"}));
        assert_eq!(status_value(&result), None);

        assert_eq!(status_value(&QueryResult::empty(0)), None);
    }

    #[test]
    fn test_first_u64() {
        assert_eq!(first_u64(&single_row(json!({"count": 4})), "count"), Some(4));
        assert_eq!(first_u64(&single_row(json!({"count": "7"})), "count"), Some(7));
        assert_eq!(first_u64(&single_row(json!({"count": null})), "count"), None);
    }

    #[test]
    fn test_instance_info_serialization_order() {
        let info = InstanceInfo {
            version: Some("8.0.36".to_string()),
            current_user: Some("root@%".to_string()),
            current_database: None,
            connected_threads: Some(3),
            uptime_seconds: Some(61),
            uptime: Some(format_uptime(61)),
            user_databases: Some(2),
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["uptime"], "1m 1s");
        assert_eq!(value["current_database"], JsonValue::Null);
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "version");
        assert_eq!(keys[6], "user_databases");
    }
}
