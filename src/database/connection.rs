//! Store connection
//!
//! This module opens the SQLite store. The session holds exactly one
//! connection for its whole lifetime.

use crate::error::{AssistantError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Connection string for a private in-memory store
const MEMORY_URL: &str = "sqlite::memory:";

/// Path that selects an in-memory store
const MEMORY_PATH: &str = ":memory:";

/// Single-connection handle to the SQLite store
#[derive(Clone)]
pub struct Store {
    /// Pool capped at one connection that never expires
    pool: SqlitePool,
    /// Location the store was opened from
    location: String,
}

impl Store {
    /// Open the store at `path`, creating the file if it does not exist
    ///
    /// The path `:memory:` opens a private in-memory store instead.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path == Path::new(MEMORY_PATH) {
            return Self::open_in_memory().await;
        }
        let location = path.display().to_string();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        Self::connect(options, location).await
    }

    /// Open a private in-memory store
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str(MEMORY_URL)
            .map_err(|e| AssistantError::db_connection(MEMORY_URL, e))?;

        Self::connect(options, MEMORY_URL.to_string()).await
    }

    async fn connect(options: SqliteConnectOptions, location: String) -> Result<Self> {
        // An in-memory database lives only as long as its connection, so the
        // single connection must never be reaped.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AssistantError::db_connection(location.clone(), e))?;

        let store = Self { pool, location };
        store.test_connection().await?;
        Ok(store)
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Where the store was opened from
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Test the connection
    pub async fn test_connection(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AssistantError::db_connection(self.location.clone(), e))?;
        Ok(())
    }

    /// Close the connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}
