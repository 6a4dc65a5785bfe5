//! Database module
//!
//! This module provides the store connection, schema introspection and
//! ad-hoc query execution.

pub mod connection;
pub mod indexer;
pub mod manager;
pub mod schema;

// Re-exports
pub use connection::Store;
pub use manager::{CellValue, DatabaseManager, QueryOutcome};
pub use schema::{Column, ColumnType, SchemaSnapshot, Table};
