//! Error log
//!
//! Append-only text file that receives a description and the full error
//! chain of every command that failed.

use crate::error::AssistantError;
use chrono::{DateTime, Utc};
use std::error::Error as StdError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only error log file
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    /// Create a log writing to `path`; the file is created on first use
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry for `error` raised while `context`
    ///
    /// A log that cannot be written is reported through tracing only.
    pub fn record(&self, context: &str, error: &(dyn StdError + 'static)) {
        tracing::error!(context, error = %error, "Command failed");

        let entry = format_entry(context, error, Utc::now());
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(entry.as_bytes()));

        if let Err(e) = result {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "Could not write to error log"
            );
        }
    }
}

/// Render one log entry: description line, the error, then its causes
pub fn format_entry(
    context: &str,
    error: &(dyn StdError + 'static),
    at: DateTime<Utc>,
) -> String {
    let mut entry = format!(
        "[{}] An error occurred while {}:\n",
        at.format("%Y-%m-%d %H:%M:%S UTC"),
        context
    );
    entry.push_str(&format!("Error: {}\n", error));
    if let Some(AssistantError::DatabaseQuery { query, .. }) = error.downcast_ref::<AssistantError>() {
        entry.push_str(&format!("Statement: {}\n", query.trim()));
    }

    let mut source = error.source();
    if source.is_some() {
        entry.push_str("Caused by:\n");
    }
    let mut depth = 0;
    while let Some(cause) = source {
        entry.push_str(&format!("    {}: {}\n", depth, cause));
        depth += 1;
        source = cause.source();
    }

    entry.push('\n');
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_entry_with_causes() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let error = AssistantError::db_query("SELEC 1", sqlx::Error::RowNotFound);

        let entry = format_entry("executing query", &error, at);
        let expected = format!(
            "[2024-03-01 12:30:00 UTC] An error occurred while executing query:\n\
             Error: {}\n\
             Statement: SELEC 1\n\
             Caused by:\n    0: {}\n\n",
            error,
            sqlx::Error::RowNotFound
        );
        assert_eq!(entry, expected);
    }

    #[test]
    fn test_format_entry_without_causes() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let error = AssistantError::InvalidTableName(String::new());
        let entry = format_entry("loading CSV", &error, at);
        assert!(!entry.contains("Caused by"));
        assert!(entry.ends_with("Error: Invalid table name: ''\n\n"));
    }

    #[test]
    fn test_record_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error_log.txt"));

        log.record("listing tables", &AssistantError::UnknownCommand("a".into()));
        log.record("listing tables", &AssistantError::UnknownCommand("b".into()));

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("An error occurred while listing tables:").count(), 2);
        assert!(content.contains("Unknown command: a"));
        assert!(content.contains("Unknown command: b"));
    }

    #[test]
    fn test_unwritable_log_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending
        let log = ErrorLog::new(dir.path());
        log.record("loading CSV", &AssistantError::EmptyCsv("x.csv".into()));
    }
}
