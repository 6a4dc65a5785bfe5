//! SQLite Assistant Library
//!
//! Loads CSV files into a local SQLite store, runs SQL against it and turns
//! plain-language requests into SQL suggestions.
//! The main binary is in src/main.rs.

pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod error_log;
pub mod ingest;
pub mod llm;
