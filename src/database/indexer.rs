//! Schema Indexer
//!
//! Introspection of the SQLite catalog: table listing, existence checks and
//! the schema snapshot used to prompt the language model.

use crate::database::schema::{Column, SchemaSnapshot, Table};
use crate::error::{AssistantError, Result};
use sqlx::{sqlite::SqlitePool, Row};

const LIST_TABLES_QUERY: &str = r#"
    SELECT name
    FROM sqlite_master
    WHERE type = 'table'
        AND name NOT LIKE 'sqlite_%'
    ORDER BY name
"#;

const TABLE_EXISTS_QUERY: &str = r#"
    SELECT COUNT(*)
    FROM sqlite_master
    WHERE type = 'table'
        AND name = ?1 COLLATE NOCASE
"#;

const TABLE_COLUMNS_QUERY: &str = r#"
    SELECT name, type
    FROM pragma_table_info(?1)
    ORDER BY cid
"#;

/// List user table names, ordered by name
pub async fn list_tables(pool: &SqlitePool) -> Result<Vec<String>> {
    let rows = sqlx::query(LIST_TABLES_QUERY)
        .fetch_all(pool)
        .await
        .map_err(|e| AssistantError::db_query(LIST_TABLES_QUERY, e))?;

    rows.iter()
        .map(|row| row.try_get::<String, _>("name").map_err(AssistantError::from))
        .collect()
}

/// Check whether a table exists (SQLite names are case-insensitive)
pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
    let (count,): (i64,) = sqlx::query_as(TABLE_EXISTS_QUERY)
        .bind(table_name)
        .fetch_one(pool)
        .await
        .map_err(|e| AssistantError::db_query(TABLE_EXISTS_QUERY, e))?;

    Ok(count > 0)
}

/// Columns of a table in declaration order; empty if the table is unknown
pub async fn table_columns(pool: &SqlitePool, table_name: &str) -> Result<Vec<Column>> {
    let rows = sqlx::query(TABLE_COLUMNS_QUERY)
        .bind(table_name)
        .fetch_all(pool)
        .await
        .map_err(|e| AssistantError::db_query(TABLE_COLUMNS_QUERY, e))?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let name: String = row.try_get("name")?;
        let declared_type: String = row.try_get("type")?;
        columns.push(Column::new(name, declared_type));
    }
    Ok(columns)
}

/// Index every user table into a schema snapshot
pub async fn index_sqlite(pool: &SqlitePool) -> Result<SchemaSnapshot> {
    let mut snapshot = SchemaSnapshot::new();

    for table_name in list_tables(pool).await? {
        let mut table = Table::new(&table_name);
        for column in table_columns(pool, &table_name).await? {
            table.add_column(column);
        }
        snapshot.add_table(table);
    }

    tracing::debug!(tables = snapshot.tables.len(), "Indexed store schema");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::Store;

    async fn store_with_tables() -> Store {
        let store = Store::open_in_memory().await.unwrap();
        sqlx::raw_sql(
            r#"
            CREATE TABLE "orders" ("id" INTEGER, "total" FLOAT, "note" TEXT);
            CREATE TABLE "Customers" ("name" TEXT);
            CREATE TABLE "seq" ("id" INTEGER PRIMARY KEY AUTOINCREMENT);
            CREATE VIEW "big_orders" AS SELECT * FROM "orders" WHERE "total" > 100;
            "#,
        )
        .execute(store.pool())
        .await
        .unwrap();
        store
    }

    #[tokio::test]
    async fn test_list_tables_skips_internal_tables_and_views() {
        let store = store_with_tables().await;
        let tables = list_tables(store.pool()).await.unwrap();
        assert_eq!(tables, vec!["Customers", "orders", "seq"]);
    }

    #[tokio::test]
    async fn test_table_exists_ignores_case() {
        let store = store_with_tables().await;
        assert!(table_exists(store.pool(), "orders").await.unwrap());
        assert!(table_exists(store.pool(), "ORDERS").await.unwrap());
        assert!(!table_exists(store.pool(), "big_orders").await.unwrap());
        assert!(!table_exists(store.pool(), "missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_table_columns_in_order() {
        let store = store_with_tables().await;
        let columns = table_columns(store.pool(), "orders").await.unwrap();
        assert_eq!(
            columns,
            vec![
                Column::new("id", "INTEGER"),
                Column::new("total", "FLOAT"),
                Column::new("note", "TEXT"),
            ]
        );
        assert!(table_columns(store.pool(), "missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_index_sqlite() {
        let store = store_with_tables().await;
        let snapshot = index_sqlite(store.pool()).await.unwrap();
        assert_eq!(snapshot.table_names(), vec!["Customers", "orders", "seq"]);

        let text = snapshot.format_for_llm();
        assert!(text.contains("Table: orders\nColumns:\n    - id (INTEGER)\n    - total (FLOAT)\n"));
        assert!(text.contains("Table: Customers\nColumns:\n    - name (TEXT)\n"));
    }
}
