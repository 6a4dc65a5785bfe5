//! CSV reader
//!
//! Reads a delimited file fully into memory as a header row plus records,
//! with missing-value markers already normalised to `None`.

use crate::error::{AssistantError, Result};
use crate::ingest::type_mapper::is_missing;
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A fully materialised CSV file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    /// Unique, non-empty column names
    pub headers: Vec<String>,
    /// One entry per header for every record; `None` is a missing value
    pub rows: Vec<Vec<Option<String>>>,
}

impl CsvTable {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Values of one column, top to bottom
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|v| v.as_deref()))
    }
}

/// CSV reader settings
#[derive(Debug, Clone)]
pub struct CsvReader {
    /// Field delimiter (default: comma)
    delimiter: u8,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvReader {
    /// Create a reader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Reader settings for a file: tab-separated for `.tsv`, comma otherwise
    pub fn for_path(path: &Path) -> Self {
        let is_tsv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));

        if is_tsv {
            Self::new().with_delimiter(b'\t')
        } else {
            Self::new()
        }
    }

    /// Read a CSV file from disk
    pub fn read_path(&self, path: &Path) -> Result<CsvTable> {
        let file = File::open(path)?;
        self.read(file, &path.display().to_string())
    }

    /// Read CSV content; `source` names the input in error messages
    ///
    /// Input that is not valid UTF-8 is rejected rather than repaired.
    pub fn read<R: Read>(&self, input: R, source: &str) -> Result<CsvTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(input);

        let raw_headers = reader.headers()?.clone();
        if raw_headers.is_empty() {
            return Err(AssistantError::EmptyCsv(source.to_string()));
        }
        let headers = normalize_headers(&raw_headers);

        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            if record.len() > headers.len() {
                return Err(AssistantError::CsvShape {
                    line: record.position().map(|p| p.line()).unwrap_or(0),
                    expected: headers.len(),
                    found: record.len(),
                });
            }

            let mut row: Vec<Option<String>> = record
                .iter()
                .map(|field| (!is_missing(field)).then(|| field.to_string()))
                .collect();
            row.resize(headers.len(), None);
            rows.push(row);
        }

        tracing::debug!(
            source,
            columns = headers.len(),
            rows = rows.len(),
            "Read CSV input"
        );
        Ok(CsvTable { headers, rows })
    }
}

/// Trim headers, name blank ones by position and suffix repeats with `.N`
fn normalize_headers(raw: &StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (index, field) in raw.iter().enumerate() {
        let name = field.trim();
        let base = if name.is_empty() {
            format!("Unnamed: {}", index)
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while !seen.insert(candidate.to_lowercase()) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        headers.push(candidate);
    }

    headers
}
