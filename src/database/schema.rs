//! Schema data structures
//!
//! This module defines the data structures for representing the store's
//! schema: column types inferred at load time, introspected tables and the
//! schema snapshot handed to the language model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Storage type of a loaded column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Every value is integral
    Integer,
    /// Every value is real-valued
    Float,
    /// Anything else
    Text,
}

impl ColumnType {
    /// SQL type name used in `CREATE TABLE`
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "FLOAT",
            ColumnType::Text => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A column as declared in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Declared type exactly as the store reports it (may be empty)
    pub declared_type: String,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.declared_type)
    }
}

/// Represents a table in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Columns in declaration order
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a new table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column to the table
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Format table schema for display
    pub fn format_schema(&self) -> String {
        let mut result = format!("Table: {}\nColumns:\n", self.name);
        for column in &self.columns {
            result.push_str(&format!("    - {}\n", column));
        }
        result
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_schema())
    }
}

/// Textual view of every table in the store, built on demand
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Tables indexed by name
    pub tables: BTreeMap<String, Table>,
}

impl SchemaSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table to the snapshot
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Get all table names
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|k| k.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Format the schema for the language model prompt
    ///
    /// Each table is followed by a blank line; an empty store yields an empty
    /// string.
    pub fn format_for_llm(&self) -> String {
        let mut result = String::new();
        for table in self.tables.values() {
            result.push_str(&table.format_schema());
            result.push('\n');
        }
        result
    }
}

impl fmt::Display for SchemaSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_for_llm())
    }
}
