//! Configuration handling for the MySQL MCP Server.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use clap::{Parser, ValueEnum};
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use std::time::Duration;

pub const DEFAULT_MYSQL_HOST: &str = "localhost";
pub const DEFAULT_MYSQL_PORT: u16 = 3306;
pub const DEFAULT_MYSQL_USER: &str = "root";

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// Pool configuration defaults
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

// DDL defaults
pub const DEFAULT_CHARSET: &str = "utf8mb4";
pub const DEFAULT_COLLATION: &str = "utf8mb4_unicode_ci";
pub const DEFAULT_ENGINE: &str = "InnoDB";

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// HTTP with Server-Sent Events (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Defaults applied by the DDL tools when the caller omits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlDefaults {
    pub charset: String,
    pub collation: String,
    pub engine: String,
}

impl Default for DdlDefaults {
    fn default() -> Self {
        Self {
            charset: DEFAULT_CHARSET.to_string(),
            collation: DEFAULT_COLLATION.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
        }
    }
}

/// Configuration for the MySQL MCP Server.
#[derive(Clone, Parser)]
#[command(
    name = "mysql-mcp-server",
    about = "MCP server for MySQL administration - lets AI assistants inspect schemas, run queries and manage databases",
    version,
    author
)]
pub struct Config {
    /// MySQL server host
    #[arg(long, default_value = DEFAULT_MYSQL_HOST, env = "MYSQL_HOST")]
    pub host: String,

    /// MySQL server port
    #[arg(long, default_value_t = DEFAULT_MYSQL_PORT, env = "MYSQL_PORT")]
    pub port: u16,

    /// MySQL user
    #[arg(long, default_value = DEFAULT_MYSQL_USER, env = "MYSQL_USER")]
    pub user: String,

    /// MySQL password (sensitive - never logged)
    #[arg(long, default_value = "", env = "MYSQL_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Database selected when a session starts. Omit for instance-wide mode.
    #[arg(long, env = "MYSQL_DATABASE")]
    pub database: Option<String>,

    /// Maximum connections in the pool
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_CONNECTIONS,
        env = "MYSQL_MAX_CONNECTIONS"
    )]
    pub max_connections: u32,

    /// Statement timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS,
        env = "MYSQL_QUERY_TIMEOUT"
    )]
    pub query_timeout: u64,

    /// Connection (pool acquire) timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "MYSQL_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Character set used by create_database/create_table when none is given
    #[arg(long, default_value = DEFAULT_CHARSET, env = "MYSQL_DEFAULT_CHARSET")]
    pub default_charset: String,

    /// Collation used by create_database when none is given
    #[arg(long, default_value = DEFAULT_COLLATION, env = "MYSQL_DEFAULT_COLLATION")]
    pub default_collation: String,

    /// Storage engine used by create_table when none is given
    #[arg(long, default_value = DEFAULT_ENGINE, env = "MYSQL_DEFAULT_ENGINE")]
    pub default_engine: String,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_HTTP_HOST,
        env = "MCP_HTTP_HOST"
    )]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(
        long,
        default_value_t = DEFAULT_HTTP_PORT,
        env = "MCP_HTTP_PORT"
    )]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_MCP_ENDPOINT,
        env = "MCP_ENDPOINT"
    )]
    pub mcp_endpoint: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            host: DEFAULT_MYSQL_HOST.to_string(),
            port: DEFAULT_MYSQL_PORT,
            user: DEFAULT_MYSQL_USER.to_string(),
            password: String::new(),
            database: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            query_timeout: DEFAULT_QUERY_TIMEOUT_SECS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            default_charset: DEFAULT_CHARSET.to_string(),
            default_collation: DEFAULT_COLLATION.to_string(),
            default_engine: DEFAULT_ENGINE.to_string(),
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Validate option combinations clap cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("max_connections must be greater than 0".to_string());
        }
        if self.query_timeout == 0 {
            return Err("query_timeout must be greater than 0".to_string());
        }
        if self.database.as_deref().is_some_and(|db| db.trim().is_empty()) {
            return Err("MYSQL_DATABASE is set but empty".to_string());
        }
        Ok(())
    }

    /// Default database for new sessions, with blank values treated as unset.
    pub fn default_database(&self) -> Option<String> {
        self.database
            .as_deref()
            .map(str::trim)
            .filter(|db| !db.is_empty())
            .map(String::from)
    }

    /// Build driver connect options from the configured server address and credentials.
    ///
    /// No schema is set here: sessions select theirs with `USE` when borrowing,
    /// so dropping the configured database never breaks new connections.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .charset("utf8mb4")
    }

    /// Build pool options (bounded capacity, acquire timeout).
    pub fn pool_options(&self) -> MySqlPoolOptions {
        MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(0)
            .acquire_timeout(self.connect_timeout_duration())
            .idle_timeout(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
    }

    /// DDL defaults derived from configuration.
    pub fn ddl_defaults(&self) -> DdlDefaults {
        DdlDefaults {
            charset: self.default_charset.clone(),
            collation: self.default_collation.clone(),
            engine: self.default_engine.clone(),
        }
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Get the MySQL server address for logging (no credentials).
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the query timeout as a Duration.
    pub fn query_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
