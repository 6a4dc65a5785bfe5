//! CSV ingestion
//!
//! This module reads delimited files, infers column types and loads the
//! data into the store.

pub mod csv_reader;
pub mod loader;
pub mod type_mapper;

// Re-exports
pub use csv_reader::{CsvReader, CsvTable};
pub use loader::{ConflictAction, ConflictResolver, LoadOutcome, TableLoader};
pub use type_mapper::{infer_column_type, map_domain_to_sql, ValueDomain};
