// SQLite Assistant: load CSV files into SQLite and query them from a prompt
//
// This is the main entry point for the sqlite-assistant binary.

use anyhow::{Context, Result};
use sqlite_assistant::cli::{Repl, Session};
use sqlite_assistant::config::AppConfig;
use sqlite_assistant::database::DatabaseManager;
use sqlite_assistant::error_log::ErrorLog;
use sqlite_assistant::llm::SqlBridge;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber; diagnostics go to stderr
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new(sqlite_assistant::config::DEFAULT_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config);

    let manager = DatabaseManager::open(&config.database_path)
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    tracing::info!(database = manager.location(), "Store opened");

    let error_log = ErrorLog::new(config.error_log_path.clone());
    let bridge = SqlBridge::from_settings(&config.llm).context("Failed to set up the LLM client")?;

    let session = Session::new(manager, error_log, bridge);
    Repl::new(session)?.run().await?;

    Ok(())
}
