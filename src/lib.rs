//! MySQL MCP Server Library
//!
//! This library exposes MySQL administration and query operations as MCP
//! (Model Context Protocol) tools for AI assistants.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{DbError, DbResult};
pub use mcp::MySqlService;
