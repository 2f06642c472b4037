//! Streamable HTTP transport for the MCP server.
//!
//! Each MCP session created over HTTP gets its own `MySqlService`, and with
//! it its own current database. All sessions share one connection pool.

use crate::config::Config;
use crate::db::ConnectionManager;
use crate::error::{DbError, DbResult};
use crate::mcp::MySqlService;
use crate::transport::{Transport, wait_for_signal};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Connections still open this long after a shutdown signal are dropped.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpTransport {
    manager: Arc<ConnectionManager>,
    host: String,
    port: u16,
    /// MCP endpoint path
    endpoint: String,
}

impl HttpTransport {
    pub fn new(
        manager: Arc<ConnectionManager>,
        host: impl Into<String>,
        port: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            manager,
            host: host.into(),
            port,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(manager: Arc<ConnectionManager>, config: &Config) -> Self {
        Self::new(
            manager,
            config.http_host.clone(),
            config.http_port,
            config.mcp_endpoint.clone(),
        )
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn run(&self) -> DbResult<()> {
        let bind_addr = self.bind_addr();
        info!(addr = %bind_addr, "Starting MCP server with HTTP transport");

        let manager = self.manager.clone();
        let service = StreamableHttpService::new(
            move || Ok(MySqlService::new(manager.clone())),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        // nest_service rejects "/", so the root endpoint uses fallback_service.
        let app = if self.endpoint == "/" {
            axum::Router::new().fallback_service(service)
        } else {
            axum::Router::new().nest_service(&self.endpoint, service)
        };

        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            DbError::connection(
                format!("Failed to bind to {}: {}", bind_addr, e),
                "Check that MCP_HTTP_HOST/MCP_HTTP_PORT name a free local address",
            )
        })?;

        info!(endpoint = %self.endpoint, "MCP endpoint ready");

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let shutdown_notify_clone = shutdown_notify.clone();
        let shutdown_signal = async move {
            wait_for_signal().await;
            shutdown_notify_clone.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        // Streaming responses can keep the server alive, so bound the drain.
        let outcome = tokio::select! {
            result = server => {
                match result {
                    Ok(()) => {
                        info!("HTTP server stopped");
                        Ok(())
                    }
                    Err(e) => {
                        error!(error = %e, "HTTP server error");
                        Err(DbError::internal(format!("HTTP server error: {}", e)))
                    }
                }
            }
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for connections to close (send signal again to force exit)"
                );
                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => Ok(()),
        };

        self.manager.close().await;
        outcome
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> Arc<ConnectionManager> {
        Arc::new(ConnectionManager::new(&Config::default()))
    }

    #[tokio::test]
    async fn test_http_transport_creation() {
        let transport = HttpTransport::new(manager(), "127.0.0.1", 8080, "/mcp");
        assert_eq!(transport.name(), "http");
        assert_eq!(transport.bind_addr(), "127.0.0.1:8080");
        assert_eq!(transport.endpoint(), "/mcp");
    }

    #[tokio::test]
    async fn test_http_transport_from_config() {
        let config = Config {
            http_host: "0.0.0.0".to_string(),
            http_port: 3000,
            mcp_endpoint: "/api/mcp".to_string(),
            ..Config::default()
        };
        let transport = HttpTransport::from_config(manager(), &config);
        assert_eq!(transport.bind_addr(), "0.0.0.0:3000");
        assert_eq!(transport.endpoint(), "/api/mcp");
    }
}
