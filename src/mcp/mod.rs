//! MCP server integration module.
//!
//! This module connects the MySQL tool handlers to the MCP protocol
//! using the rmcp framework.

pub mod service;

pub use service::{ERROR_PREFIX, MySqlService};
