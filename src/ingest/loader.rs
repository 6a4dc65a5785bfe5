//! Table Loader
//!
//! Loads a CSV file into a table of the store. The column types are inferred
//! from the data; an existing table of the same name is resolved through a
//! [`ConflictResolver`] (overwrite, rename or skip).

use crate::database::manager::{quote_identifier, DatabaseManager};
use crate::database::schema::ColumnType;
use crate::error::{AssistantError, Result};
use crate::ingest::csv_reader::{CsvReader, CsvTable};
use crate::ingest::type_mapper::infer_column_type;
use sqlx::SqliteConnection;
use std::path::Path;

/// What to do when the target table already exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictAction {
    /// Drop the existing table and recreate it from the file
    Overwrite,
    /// Load into a table with this name instead
    Rename(String),
    /// Leave the store untouched
    Skip,
}

/// Decides how to handle a load into an existing table
pub trait ConflictResolver {
    /// Called with the name of the table that already exists
    fn resolve(&mut self, table_name: &str) -> Result<ConflictAction>;
}

/// A resolver that always gives the same answer
impl ConflictResolver for ConflictAction {
    fn resolve(&mut self, _table_name: &str) -> Result<ConflictAction> {
        Ok(self.clone())
    }
}

/// Result of a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A new table was created (possibly under a renamed target)
    Created { table: String, rows: usize },
    /// An existing table was dropped and recreated
    Overwritten { table: String, rows: usize },
    /// The table existed and the load was skipped
    Skipped { table: String },
}

/// A column definition inferred from the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

/// Loads CSV files into the store
pub struct TableLoader<'a> {
    manager: &'a DatabaseManager,
    reader: CsvReader,
}

impl<'a> TableLoader<'a> {
    /// Create a loader writing through `manager`
    pub fn new(manager: &'a DatabaseManager) -> Self {
        Self {
            manager,
            reader: CsvReader::new(),
        }
    }

    /// Use custom CSV reader settings
    pub fn with_reader(mut self, reader: CsvReader) -> Self {
        self.reader = reader;
        self
    }

    /// Read `file_path` fully and load it into `table_name`
    pub async fn load(
        &self,
        file_path: &Path,
        table_name: &str,
        resolver: &mut dyn ConflictResolver,
    ) -> Result<LoadOutcome> {
        let data = self.reader.read_path(file_path)?;
        tracing::info!(
            file = %file_path.display(),
            table = table_name,
            columns = data.column_count(),
            rows = data.row_count(),
            "Loading CSV"
        );
        self.load_table(&data, table_name, resolver).await
    }

    /// Load already parsed CSV data into `table_name`
    ///
    /// A rename target that exists too is put back to the resolver, so the
    /// original table is never modified by a rename. The drop of an
    /// overwritten table, the create and the inserts share one transaction:
    /// a failed load leaves the store as it was.
    pub async fn load_table(
        &self,
        data: &CsvTable,
        table_name: &str,
        resolver: &mut dyn ConflictResolver,
    ) -> Result<LoadOutcome> {
        let columns = infer_schema(data);
        let mut target = validate_table_name(table_name)?;
        let mut overwritten = false;

        while self.manager.table_exists(&target).await? {
            match resolver.resolve(&target)? {
                ConflictAction::Overwrite => {
                    overwritten = true;
                    break;
                }
                ConflictAction::Rename(new_name) => {
                    target = validate_table_name(&new_name)?;
                }
                ConflictAction::Skip => {
                    tracing::info!(table = %target, "Load skipped, table left unchanged");
                    return Ok(LoadOutcome::Skipped { table: target });
                }
            }
        }

        let mut tx = self.manager.pool().begin().await?;
        if overwritten {
            let sql = format!("DROP TABLE {}", quote_identifier(&target));
            execute_in(&mut tx, &sql).await?;
        }
        execute_in(&mut tx, &create_table_sql(&target, &columns)).await?;
        let rows = append_rows(&mut tx, &target, &columns, data).await?;
        tx.commit().await?;

        if overwritten {
            tracing::info!(table = %target, rows, "Table overwritten");
            Ok(LoadOutcome::Overwritten {
                table: target,
                rows,
            })
        } else {
            tracing::info!(table = %target, rows, "Table created");
            Ok(LoadOutcome::Created {
                table: target,
                rows,
            })
        }
    }
}

async fn execute_in(conn: &mut SqliteConnection, sql: &str) -> Result<()> {
    sqlx::query(sql)
        .execute(&mut *conn)
        .await
        .map_err(|e| AssistantError::db_query(sql, e))?;
    Ok(())
}

/// Insert every record into a freshly created table
async fn append_rows(
    conn: &mut SqliteConnection,
    table_name: &str,
    columns: &[ColumnDef],
    data: &CsvTable,
) -> Result<usize> {
    let sql = insert_sql(table_name, columns);

    for row in &data.rows {
        let mut query = sqlx::query(&sql);
        for (column, value) in columns.iter().zip(row) {
            let numeric = value.as_deref().map(str::trim);
            query = match column.column_type {
                ColumnType::Integer => query.bind(numeric.and_then(|v| v.parse::<i64>().ok())),
                ColumnType::Float => query.bind(numeric.and_then(|v| v.parse::<f64>().ok())),
                ColumnType::Text => query.bind(value.clone()),
            };
        }
        query
            .execute(&mut *conn)
            .await
            .map_err(|e| AssistantError::db_query(sql.as_str(), e))?;
    }

    tracing::debug!(table = table_name, rows = data.rows.len(), "Appended rows");
    Ok(data.rows.len())
}

/// Infer one column definition per CSV header
pub fn infer_schema(data: &CsvTable) -> Vec<ColumnDef> {
    data.headers
        .iter()
        .enumerate()
        .map(|(index, name)| ColumnDef {
            name: name.clone(),
            column_type: infer_column_type(data.column_values(index)),
        })
        .collect()
}

/// `CREATE TABLE` statement with every identifier quoted
pub fn create_table_sql(table_name: &str, columns: &[ColumnDef]) -> String {
    let columns_def: Vec<String> = columns
        .iter()
        .map(|c| format!("{} {}", quote_identifier(&c.name), c.column_type))
        .collect();

    format!(
        "CREATE TABLE {} (\n  {}\n)",
        quote_identifier(table_name),
        columns_def.join(",\n  ")
    )
}

/// Parameterised `INSERT` statement for one row
pub fn insert_sql(table_name: &str, columns: &[ColumnDef]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_identifier(&c.name)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table_name),
        names.join(", "),
        placeholders.join(", ")
    )
}

fn validate_table_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AssistantError::InvalidTableName(name.to_string()));
    }
    Ok(name.to_string())
}
