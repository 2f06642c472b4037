//! Database access layer.
//!
//! This module provides:
//! - Connection pool management
//! - Per-session database selection
//! - Statement execution
//! - SQL text builders for administrative statements
//! - Type mappings from MySQL values to JSON

pub mod executor;
pub mod pool;
pub mod session;
pub mod statements;
pub mod types;

pub use executor::QueryExecutor;
pub use pool::ConnectionManager;
pub use session::{SessionConnection, SessionContext};
