//! Stdio transport for the MCP server.
//!
//! JSON-RPC messages are read from stdin and written to stdout, so nothing
//! else may write to stdout while this transport runs.

use crate::db::ConnectionManager;
use crate::error::{DbError, DbResult};
use crate::mcp::MySqlService;
use crate::transport::{Transport, wait_for_signal};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tracing::{info, warn};

/// Stdio transport implementation. Serves a single MCP session.
pub struct StdioTransport {
    manager: Arc<ConnectionManager>,
}

impl StdioTransport {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> DbResult<()> {
        info!("Starting MCP server with stdio transport");

        let service = MySqlService::new(self.manager.clone());
        let running_service = service
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("Failed to start stdio transport: {}", e)))?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_quit_reason) => info!("Stdio transport completed normally"),
                    Err(e) => {
                        warn!(error = %e, "Stdio transport error");
                        self.manager.close().await;
                        return Err(DbError::internal(format!("Stdio transport error: {}", e)));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            tokio::spawn(async {
                wait_for_signal().await;
                warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });
        }

        self.manager.close().await;

        if shutdown_requested {
            // A blocking stdin read cannot be interrupted by select!.
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_stdio_transport_creation() {
        let manager = Arc::new(ConnectionManager::new(&Config::default()));
        let transport = StdioTransport::new(manager);
        assert_eq!(transport.name(), "stdio");
    }
}
