//! Error types for the SQLite assistant
//!
//! This module defines the error types used throughout the application.

use thiserror::Error;

/// Result type alias for the SQLite assistant
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Main error type for the SQLite assistant
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database errors raised by a specific statement
    #[error("Query failed: {source}")]
    DatabaseQuery {
        /// Statement that was being executed
        query: String,
        #[source]
        source: sqlx::Error,
    },

    /// Failure opening the store
    #[error("Could not open database '{path}'")]
    DatabaseConnection {
        /// Path of the store that could not be opened
        path: String,
        #[source]
        source: sqlx::Error,
    },

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV file has no header row
    #[error("CSV file '{0}' is empty")]
    EmptyCsv(String),

    /// A record carries more fields than the header declares
    #[error("CSV line {line}: expected {expected} fields, found {found}")]
    CsvShape {
        /// 1-based line number in the file
        line: u64,
        /// Number of header columns
        expected: usize,
        /// Number of fields in the record
        found: usize,
    },

    /// HTTP-related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM API returned an error response
    #[error("{provider} API error (status {status}): {message}")]
    LLMApiError {
        /// Provider name
        provider: String,
        /// Response body or parse failure
        message: String,
        /// HTTP status code (0 when the body could not be parsed)
        status: u16,
    },

    /// LLM API key is not configured
    #[error("No API key configured for {0}")]
    LLMApiKeyMissing(String),

    /// The model answered without any SQL
    #[error("The language model returned an empty response")]
    EmptyCompletion,

    /// Table names must be non-empty
    #[error("Invalid table name: '{0}'")]
    InvalidTableName(String),

    /// Unknown REPL command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl AssistantError {
    /// Wrap a driver error together with the statement that raised it
    pub fn db_query(query: impl Into<String>, source: sqlx::Error) -> Self {
        Self::DatabaseQuery {
            query: query.into(),
            source,
        }
    }

    /// Wrap a driver error raised while opening the store
    pub fn db_connection(path: impl Into<String>, source: sqlx::Error) -> Self {
        Self::DatabaseConnection {
            path: path.into(),
            source,
        }
    }
}
