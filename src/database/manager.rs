//! Database Manager
//!
//! This module implements the DatabaseManager struct which owns the session's
//! store connection and executes ad-hoc statements against it.

use crate::database::connection::Store;
use crate::database::indexer;
use crate::database::schema::{Column, SchemaSnapshot};
use crate::error::{AssistantError, Result};
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use sqlx::{Column as _, Row, TypeInfo, ValueRef};
use std::fmt;
use std::path::Path;

/// Leading keywords of statements that produce a result set
const ROW_RETURNING_KEYWORDS: &[&str] = &["select", "with", "pragma", "values", "explain"];

/// A single value returned by a query
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Real(v) => write!(f, "{}", v),
            CellValue::Text(v) => write!(f, "{}", v),
            CellValue::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

/// Result of executing an ad-hoc statement
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Rows produced by a SELECT-like statement
    Rows {
        /// Column names (empty when no row was returned)
        columns: Vec<String>,
        /// Row values in column order
        rows: Vec<Vec<CellValue>>,
    },
    /// A statement that modified the store and was committed
    Executed {
        /// Number of rows changed
        rows_affected: u64,
    },
}

/// Database Manager
///
/// Holds the one store connection used for the whole interactive session.
pub struct DatabaseManager {
    store: Store,
}

impl DatabaseManager {
    /// Open the store file at `path`, creating it if needed
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Store::open(path).await?;
        tracing::info!(store = store.location(), "Opened store");
        Ok(Self { store })
    }

    /// Open a private in-memory store
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self {
            store: Store::open_in_memory().await?,
        })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        self.store.pool()
    }

    /// Where the store was opened from
    pub fn location(&self) -> &str {
        self.store.location()
    }

    /// Execute one ad-hoc statement
    ///
    /// SELECT-like statements return their rows; anything else runs in
    /// autocommit mode and reports the number of rows it changed. The count
    /// comes from `total_changes()`, so DDL reports zero.
    pub async fn execute(&self, sql: &str) -> Result<QueryOutcome> {
        let mut conn = self.pool().acquire().await?;

        if returns_rows(sql) {
            let rows = sqlx::raw_sql(sql)
                .fetch_all(&mut *conn)
                .await
                .map_err(|e| AssistantError::db_query(sql, e))?;
            tracing::debug!(rows = rows.len(), "Query returned rows");
            rows_to_outcome(&rows)
        } else {
            let before = total_changes(&mut conn).await?;
            sqlx::raw_sql(sql)
                .execute(&mut *conn)
                .await
                .map_err(|e| AssistantError::db_query(sql, e))?;
            let rows_affected = total_changes(&mut conn).await?.saturating_sub(before);
            tracing::debug!(rows_affected, "Statement committed");
            Ok(QueryOutcome::Executed { rows_affected })
        }
    }

    /// List user table names
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        indexer::list_tables(self.pool()).await
    }

    /// Check whether a table exists
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        indexer::table_exists(self.pool(), table_name).await
    }

    /// Columns of a table in declaration order
    pub async fn table_columns(&self, table_name: &str) -> Result<Vec<Column>> {
        indexer::table_columns(self.pool(), table_name).await
    }

    /// Number of rows in a table
    pub async fn row_count(&self, table_name: &str) -> Result<i64> {
        let query = format!("SELECT COUNT(*) FROM {}", quote_identifier(table_name));
        let (count,): (i64,) = sqlx::query_as(&query)
            .fetch_one(self.pool())
            .await
            .map_err(|e| AssistantError::db_query(query.as_str(), e))?;
        Ok(count)
    }

    /// Build a fresh schema snapshot
    pub async fn schema_snapshot(&self) -> Result<SchemaSnapshot> {
        indexer::index_sqlite(self.pool()).await
    }

    /// Close the store connection
    pub async fn close(&self) {
        self.store.close().await;
        tracing::info!(store = self.store.location(), "Closed store");
    }

    pub fn is_closed(&self) -> bool {
        self.store.is_closed()
    }
}

/// Quote an identifier for SQLite, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Whether a statement produces a result set
pub fn returns_rows(sql: &str) -> bool {
    let keyword: String = skip_leading_comments(sql)
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase();

    ROW_RETURNING_KEYWORDS.contains(&keyword.as_str())
}

/// Drop whitespace and `--` / `/* */` comments before the first keyword
fn skip_leading_comments(sql: &str) -> &str {
    let mut rest = sql.trim_start();
    loop {
        if let Some(line) = rest.strip_prefix("--") {
            rest = line.split_once('\n').map(|(_, tail)| tail).unwrap_or("");
        } else if let Some(block) = rest.strip_prefix("/*") {
            rest = block.split_once("*/").map(|(_, tail)| tail).unwrap_or("");
        } else {
            return rest;
        }
        rest = rest.trim_start();
    }
}

/// Rows changed by INSERT/UPDATE/DELETE since the connection opened
async fn total_changes(conn: &mut SqliteConnection) -> Result<u64> {
    let total: i64 = sqlx::query_scalar("SELECT total_changes()")
        .fetch_one(&mut *conn)
        .await?;
    Ok(u64::try_from(total).unwrap_or(0))
}

fn rows_to_outcome(rows: &[SqliteRow]) -> Result<QueryOutcome> {
    let columns = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();

    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = Vec::with_capacity(row.len());
        for index in 0..row.len() {
            cells.push(decode_cell(row, index)?);
        }
        values.push(cells);
    }

    Ok(QueryOutcome::Rows {
        columns,
        rows: values,
    })
}

/// Decode a cell by its runtime storage class
fn decode_cell(row: &SqliteRow, index: usize) -> Result<CellValue> {
    let storage_class = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(CellValue::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match storage_class.as_str() {
        "INTEGER" => CellValue::Integer(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => CellValue::Real(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => CellValue::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => CellValue::Text(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
