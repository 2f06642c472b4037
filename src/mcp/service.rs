//! MCP service implementation using rmcp.
//!
//! This module defines the MySqlService struct with all MySQL tools exposed
//! via the MCP protocol using the rmcp framework's macros. Each service
//! instance owns one session's current-database state.

use crate::db::{ConnectionManager, SessionContext};
use crate::error::DbResult;
use crate::tools::admin::AdminToolHandler;
use crate::tools::database::{
    CreateDatabaseInput, DatabaseToolHandler, DropDatabaseInput, UseDatabaseInput,
};
use crate::tools::query::{QueryToolHandler, ReadQueryInput, WriteQueryInput};
use crate::tools::schema::{
    AlterTableInput, CreateTableInput, DropTableInput, ListTablesInput, SchemaToolHandler,
    TableInput,
};
use crate::tools::ToolResponse;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;
use tracing::warn;

/// Tag that starts the text of every failed tool result.
pub const ERROR_PREFIX: &str = "Error: ";

/// Convert a handler outcome into an MCP tool result.
///
/// Handler failures become `isError` results, never protocol errors.
pub fn to_call_result(tool: &str, result: DbResult<ToolResponse>) -> CallToolResult {
    match result {
        Ok(response) => CallToolResult::success(vec![Content::text(response.render())]),
        Err(e) => {
            if e.is_validation() {
                warn!(tool = %tool, error = %e, "Tool input rejected");
            } else {
                warn!(tool = %tool, error = %e, "Tool call failed");
            }
            CallToolResult::error(vec![Content::text(format!("{}{}", ERROR_PREFIX, e))])
        }
    }
}

#[derive(Clone)]
pub struct MySqlService {
    /// Shared connection pool
    manager: Arc<ConnectionManager>,
    /// Current database of the MCP session this service serves
    session: Arc<SessionContext>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl MySqlService {
    /// Create a service for a new session, starting at the configured default database.
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        let session = Arc::new(manager.new_session());
        Self::with_session(manager, session)
    }

    pub fn with_session(manager: Arc<ConnectionManager>, session: Arc<SessionContext>) -> Self {
        Self {
            manager,
            session,
            tool_router: Self::tool_router(),
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn databases(&self) -> DatabaseToolHandler {
        DatabaseToolHandler::new(self.manager.clone(), self.session.clone())
    }

    fn schema(&self) -> SchemaToolHandler {
        SchemaToolHandler::new(self.manager.clone(), self.session.clone())
    }

    fn queries(&self) -> QueryToolHandler {
        QueryToolHandler::new(self.manager.clone(), self.session.clone())
    }

    fn admin(&self) -> AdminToolHandler {
        AdminToolHandler::new(self.manager.clone(), self.session.clone())
    }
}

#[tool_router]
impl MySqlService {
    #[tool(description = "List all databases on the MySQL server.")]
    async fn list_databases(&self) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "list_databases",
            self.databases().list_databases().await,
        ))
    }

    #[tool(
        description = "Select the current database for this session.\nLater tools without a `database` argument run against it."
    )]
    async fn use_database(
        &self,
        Parameters(input): Parameters<UseDatabaseInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "use_database",
            self.databases().use_database(input).await,
        ))
    }

    #[tool(
        description = "Return the session's current database as reported by the server (null when none is selected)."
    )]
    async fn get_current_database(&self) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "get_current_database",
            self.databases().get_current_database().await,
        ))
    }

    #[tool(
        description = "List tables in a database.\nDefaults to the session's current database."
    )]
    async fn list_tables(
        &self,
        Parameters(input): Parameters<ListTablesInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "list_tables",
            self.schema().list_tables(input).await,
        ))
    }

    #[tool(description = "Describe a table's columns (DESCRIBE).")]
    async fn describe_table(
        &self,
        Parameters(input): Parameters<TableInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "describe_table",
            self.schema().describe_table(input).await,
        ))
    }

    #[tool(description = "Show the CREATE TABLE statement for a table.")]
    async fn show_create_table(
        &self,
        Parameters(input): Parameters<TableInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "show_create_table",
            self.schema().show_create_table(input).await,
        ))
    }

    #[tool(
        description = "Run a read-only SQL statement (SELECT, SHOW, DESCRIBE, DESC, EXPLAIN or WITH).\nOther statements are rejected without contacting the server.\nOptional `database` runs the query there and switches back afterwards.\nOutput format: json (default), table, or markdown."
    )]
    async fn read_query(
        &self,
        Parameters(input): Parameters<ReadQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "read_query",
            self.queries().read_query(input).await,
        ))
    }

    #[tool(
        description = "Run any SQL statement (INSERT, UPDATE, DELETE, DDL, ...).\nThe SQL is sent verbatim: the caller is responsible for its safety.\nReturns affected_rows and last_insert_id, or rows if the statement produced any.\nOptional `database` runs the statement there and switches back afterwards."
    )]
    async fn write_query(
        &self,
        Parameters(input): Parameters<WriteQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "write_query",
            self.queries().write_query(input).await,
        ))
    }

    #[tool(
        description = "Create a database.\nDefaults: IF NOT EXISTS, character set utf8mb4, collation utf8mb4_unicode_ci."
    )]
    async fn create_database(
        &self,
        Parameters(input): Parameters<CreateDatabaseInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "create_database",
            self.databases().create_database(input).await,
        ))
    }

    #[tool(
        description = "Drop a database and all of its tables.\nDefaults to IF EXISTS. Clears the session's current database if it was the one dropped."
    )]
    async fn drop_database(
        &self,
        Parameters(input): Parameters<DropDatabaseInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "drop_database",
            self.databases().drop_database(input).await,
        ))
    }

    #[tool(
        description = "Create a table.\n`columns` is raw SQL inserted verbatim, e.g. \"id INT PRIMARY KEY, name VARCHAR(50)\"; the caller is responsible for its safety.\nDefaults: IF NOT EXISTS, ENGINE=InnoDB, DEFAULT CHARSET=utf8mb4."
    )]
    async fn create_table(
        &self,
        Parameters(input): Parameters<CreateTableInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "create_table",
            self.schema().create_table(input).await,
        ))
    }

    #[tool(
        description = "Alter a table column: ADD, MODIFY, CHANGE or DROP.\n`column_spec` and `position` are raw SQL inserted verbatim; the caller is responsible for their safety."
    )]
    async fn alter_table(
        &self,
        Parameters(input): Parameters<AlterTableInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "alter_table",
            self.schema().alter_table(input).await,
        ))
    }

    #[tool(description = "Drop a table. Defaults to IF EXISTS.")]
    async fn drop_table(
        &self,
        Parameters(input): Parameters<DropTableInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "drop_table",
            self.schema().drop_table(input).await,
        ))
    }

    #[tool(
        description = "Summarize the MySQL instance: version, current user, current database, connected threads, uptime and number of user databases."
    )]
    async fn instance_info(&self) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "instance_info",
            self.admin().instance_info().await,
        ))
    }

    #[tool(description = "Show the server version, current user and current database.")]
    async fn database_info(&self) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "database_info",
            self.admin().database_info().await,
        ))
    }

    #[tool(
        description = "List MySQL accounts (user, host) from mysql.user.\nRequires SELECT privilege on the mysql schema."
    )]
    async fn list_users(&self) -> Result<CallToolResult, McpError> {
        Ok(to_call_result("list_users", self.admin().list_users().await))
    }

    #[tool(description = "Show the server's process list (SHOW PROCESSLIST).")]
    async fn show_processlist(&self) -> Result<CallToolResult, McpError> {
        Ok(to_call_result(
            "show_processlist",
            self.admin().show_processlist().await,
        ))
    }
}

#[tool_handler]
impl ServerHandler for MySqlService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mysql-mcp-server".to_owned(),
                title: Some("MySQL MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "MySQL administration and query tools.\n\
                \n\
                ## Workflow\n\
                1. Call `list_databases`, then `use_database` to pick one for this session\n\
                2. Explore with `list_tables`, `describe_table` and `show_create_table`\n\
                3. Read data with `read_query`; change data or schema with `write_query`\n\
                \n\
                ## Current Database\n\
                - Each session has its own current database; `get_current_database` reports it\n\
                - `read_query`/`write_query` accept `database` to run elsewhere without changing it\n\
                - Table tools accept `database` to qualify the table name\n\
                - Dropping the current database leaves no database selected\n\
                \n\
                ## Safety\n\
                - `read_query` only accepts SELECT, SHOW, DESCRIBE, DESC, EXPLAIN and WITH\n\
                - Database and table names are always quoted\n\
                - SQL text, column definitions and position clauses are sent verbatim\n\
                \n\
                ## Errors\n\
                Failed calls return text starting with \"Error: \" and the server's message."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::DbError;

    fn create_test_service() -> MySqlService {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 1,
            database: Some("main_db".to_string()),
            ..Config::default()
        };
        MySqlService::new(Arc::new(ConnectionManager::new(&config)))
    }

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_success_result() {
        let result = to_call_result("use_database", Ok(ToolResponse::text("Switched")));
        assert_eq!(result.is_error, Some(false));
        assert_eq!(text_of(&result), "Switched");
    }

    #[test]
    fn test_error_result_has_prefix() {
        let result = to_call_result(
            "read_query",
            Err(DbError::invalid_input("SQL statement cannot be empty")),
        );
        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            text_of(&result),
            "Error: Invalid input: SQL statement cannot be empty"
        );
    }

    #[tokio::test]
    async fn test_service_starts_at_default_database() {
        let service = create_test_service();
        assert_eq!(
            service.session().current_database().await.as_deref(),
            Some("main_db")
        );
    }

    #[tokio::test]
    async fn test_each_service_has_its_own_session() {
        let a = create_test_service();
        let b = create_test_service();
        a.session().set_current_database(Some("db1".to_string())).await;
        assert_eq!(b.session().current_database().await.as_deref(), Some("main_db"));
    }

    #[tokio::test]
    async fn test_read_query_rejects_write_without_contacting_server() {
        let service = create_test_service();
        let result = service
            .read_query(Parameters(ReadQueryInput {
                sql: "DROP DATABASE main_db".to_string(),
                database: None,
                format: Default::default(),
                decode_binary: true,
            }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).starts_with("Error: Permission denied: DROP"));
    }

    #[tokio::test]
    async fn test_use_database_rejects_blank_name() {
        let service = create_test_service();
        let result = service
            .use_database(Parameters(UseDatabaseInput {
                database: "   ".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("Database name is required"));
    }

    #[tokio::test]
    async fn test_server_info() {
        let service = create_test_service();
        let info = service.get_info();
        assert_eq!(info.server_info.name, "mysql-mcp-server");
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("read_query"));
    }

    #[tokio::test]
    async fn test_all_tools_registered() {
        let service = create_test_service();
        let mut names: Vec<String> = service
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "alter_table",
                "create_database",
                "create_table",
                "database_info",
                "describe_table",
                "drop_database",
                "drop_table",
                "get_current_database",
                "instance_info",
                "list_databases",
                "list_tables",
                "list_users",
                "read_query",
                "show_create_table",
                "show_processlist",
                "use_database",
                "write_query",
            ]
        );
    }
}
