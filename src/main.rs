//! MySQL MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to inspect and administer a MySQL server.

use mysql_mcp_server::config::{Config, TransportMode};
use mysql_mcp_server::db::ConnectionManager;
use mysql_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr: stdout carries the stdio transport.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() {
    let config = Config::parse_args();
    init_tracing(&config);

    if let Err(message) = config.validate() {
        error!(error = %message, "Invalid configuration");
        std::process::exit(1);
    }

    info!(
        transport = %config.transport,
        "Starting MySQL MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let manager = Arc::new(ConnectionManager::new(&config));

    if let Err(e) = manager.ping().await {
        error!(
            server = %config.server_addr(),
            error = %e,
            suggestion = e.suggestion().unwrap_or_default(),
            "Could not connect to MySQL"
        );
        std::process::exit(1);
    }
    info!(server = %config.server_addr(), "Connected to MySQL");

    let result = match config.transport {
        TransportMode::Stdio => StdioTransport::new(manager).run().await,
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            HttpTransport::from_config(manager, &config).run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}
