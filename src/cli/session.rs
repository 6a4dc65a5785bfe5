//! Command handlers
//!
//! A [`Session`] owns everything a command needs: the store, the error log
//! and (when configured) the natural-language bridge. Each handler returns the
//! message to show; failures are written to the error log and turned into a
//! short message so the loop can continue.

use crate::cli::commands::{help_text, Command, CommandType};
use crate::cli::console::{Console, PromptConflictResolver};
use crate::config::env;
use crate::database::manager::{DatabaseManager, QueryOutcome};
use crate::error::{AssistantError, Result};
use crate::error_log::ErrorLog;
use crate::ingest::csv_reader::CsvReader;
use crate::ingest::loader::{LoadOutcome, TableLoader};
use crate::llm::bridge::SqlBridge;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table as TextTable};
use std::path::Path;

/// Interactive session state
pub struct Session {
    manager: DatabaseManager,
    error_log: ErrorLog,
    bridge: Option<SqlBridge>,
}

impl Session {
    /// Create a new session
    pub fn new(manager: DatabaseManager, error_log: ErrorLog, bridge: Option<SqlBridge>) -> Self {
        Self {
            manager,
            error_log,
            bridge,
        }
    }

    pub fn manager(&self) -> &DatabaseManager {
        &self.manager
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    /// Whether `aiquery` can be used
    pub fn has_bridge(&self) -> bool {
        self.bridge.is_some()
    }

    /// Run one command and return the message to print
    pub async fn handle_command(&mut self, command: &Command, console: &mut dyn Console) -> String {
        match command.command_type {
            CommandType::Help => help_text().to_string(),
            CommandType::Load => self.handle_load(console).await,
            CommandType::Query => self.handle_query(console).await,
            CommandType::List => self.handle_list().await,
            CommandType::AiQuery => self.handle_ai_query(console).await,
            CommandType::Exit => "Exiting the application.".to_string(),
        }
    }

    /// Close the store connection
    pub async fn close(&self) {
        self.manager.close().await;
    }

    async fn handle_load(&mut self, console: &mut dyn Console) -> String {
        let Some(file_path) = prompt_non_empty(console, "Enter the path to the CSV file: ") else {
            return "No file given; nothing loaded.".to_string();
        };
        let Some(table_name) = prompt_non_empty(console, "Enter the desired table name: ") else {
            return "No table name given; nothing loaded.".to_string();
        };

        let path = Path::new(&file_path);
        let loader = TableLoader::new(&self.manager).with_reader(CsvReader::for_path(path));
        let mut resolver = PromptConflictResolver::new(console);
        let result = loader.load(path, &table_name, &mut resolver).await;

        match result {
            Ok(outcome) => format_load_outcome(&outcome),
            Err(e) => self.report("loading CSV", &e),
        }
    }

    async fn handle_query(&mut self, console: &mut dyn Console) -> String {
        let Some(sql) = prompt_non_empty(console, "Enter your SQL query: ") else {
            return "No query entered.".to_string();
        };

        self.run_sql(&sql).await
    }

    async fn handle_list(&mut self) -> String {
        match self.manager.list_tables().await {
            Ok(tables) if tables.is_empty() => "No tables found in the database.".to_string(),
            Ok(tables) => {
                let mut message = String::from("Tables in the database:");
                for table in tables {
                    message.push_str(&format!("\n  {}", table));
                }
                message
            }
            Err(e) => self.report("listing tables", &e),
        }
    }

    async fn handle_ai_query(&mut self, console: &mut dyn Console) -> String {
        if self.bridge.is_none() {
            return format!(
                "aiquery is unavailable: set {} to enable it.",
                env::API_KEY
            );
        }

        let Some(request) =
            prompt_non_empty(console, "Describe what you want in plain English: ")
        else {
            return "No request entered.".to_string();
        };

        let sql = match self.suggest_sql(&request).await {
            Ok(sql) => sql,
            Err(e) => return self.report("generating SQL with LLM", &e),
        };

        console.print(&format!("Suggested SQL:\n{}", sql));
        let confirmed = match console.prompt("Execute this query? (y/n): ") {
            Ok(answer) => answer
                .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
                .unwrap_or(false),
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation prompt failed");
                false
            }
        };

        if !confirmed {
            return "Query not executed.".to_string();
        }
        self.run_sql(&sql).await
    }

    async fn suggest_sql(&self, request: &str) -> Result<String> {
        let snapshot = self.manager.schema_snapshot().await?;
        match &self.bridge {
            Some(bridge) => bridge.suggest_sql(&snapshot, request).await,
            None => Err(AssistantError::LLMApiKeyMissing(
                "OpenAI".to_string(),
            )),
        }
    }

    async fn run_sql(&self, sql: &str) -> String {
        match self.manager.execute(sql).await {
            Ok(outcome) => format_query_outcome(&outcome),
            Err(e) => self.report("executing query", &e),
        }
    }

    /// Log a failed command and build the message shown to the user
    fn report(&self, context: &str, error: &AssistantError) -> String {
        self.error_log.record(context, error);
        format!(
            "Error {}: {}. See {} for details.",
            context,
            error,
            self.error_log.path().display()
        )
    }
}

/// Prompt once; blank answers and closed input yield `None`
fn prompt_non_empty(console: &mut dyn Console, message: &str) -> Option<String> {
    match console.prompt(message) {
        Ok(Some(answer)) if !answer.trim().is_empty() => Some(answer.trim().to_string()),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Prompt failed");
            None
        }
    }
}

/// Message for a finished load
pub fn format_load_outcome(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Created { table, rows } => {
            format!("Table '{}' created with {} rows.", table, rows)
        }
        LoadOutcome::Overwritten { table, rows } => {
            format!("Table '{}' overwritten with {} rows.", table, rows)
        }
        LoadOutcome::Skipped { table } => {
            format!("Skipped loading; table '{}' was left unchanged.", table)
        }
    }
}

/// Render query results as a table followed by a row count
pub fn format_query_outcome(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::Executed { rows_affected } => format!(
            "Query executed successfully. {} row(s) affected.",
            rows_affected
        ),
        QueryOutcome::Rows { rows, .. } if rows.is_empty() => "(0 rows)".to_string(),
        QueryOutcome::Rows { columns, rows } => {
            let mut table = TextTable::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(columns.clone());
            for row in rows {
                table.add_row(row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());
            }
            let noun = if rows.len() == 1 { "row" } else { "rows" };
            format!("{}\n({} {})", table, rows.len(), noun)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::console::ScriptedConsole;
    use crate::database::manager::CellValue;
    use crate::llm::provider::{GenerationParams, LLMProvider, LLMResponse, Message};
    use async_trait::async_trait;

    struct DropTableProvider;

    #[async_trait]
    impl LLMProvider for DropTableProvider {
        async fn generate(
            &self,
            _messages: &[Message],
            _params: &GenerationParams,
        ) -> Result<LLMResponse> {
            Ok(LLMResponse::new("DROP TABLE kept"))
        }

        fn provider_name(&self) -> &str {
            "DropTable"
        }

        fn has_api_key(&self) -> bool {
            true
        }
    }

    /// Answers the first prompt, then fails like a broken terminal
    struct BrokenAfterFirst {
        answered: bool,
    }

    impl Console for BrokenAfterFirst {
        fn prompt(&mut self, _message: &str) -> Result<Option<String>> {
            if self.answered {
                return Err(AssistantError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "terminal gone",
                )));
            }
            self.answered = true;
            Ok(Some("drop it".to_string()))
        }

        fn print(&mut self, _text: &str) {}
    }

    async fn session_in(dir: &tempfile::TempDir) -> Session {
        let manager = DatabaseManager::open_in_memory().await.unwrap();
        let error_log = ErrorLog::new(dir.path().join("error_log.txt"));
        Session::new(manager, error_log, None)
    }

    fn command(command_type: CommandType) -> Command {
        Command { command_type }
    }

    #[test]
    fn test_format_query_outcome() {
        let outcome = QueryOutcome::Rows {
            columns: vec!["id".into(), "name".into()],
            rows: vec![vec![CellValue::Integer(7), CellValue::Text("ada".into())]],
        };
        let text = format_query_outcome(&outcome);
        assert!(text.contains("id"));
        assert!(text.contains("ada"));
        assert!(text.ends_with("(1 row)"));

        let text = format_query_outcome(&QueryOutcome::Executed { rows_affected: 2 });
        assert_eq!(text, "Query executed successfully. 2 row(s) affected.");
    }

    #[test]
    fn test_format_load_outcome() {
        let text = format_load_outcome(&LoadOutcome::Skipped {
            table: "t".to_string(),
        });
        assert_eq!(text, "Skipped loading; table 't' was left unchanged.");
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir).await;
        let mut console = ScriptedConsole::default();

        let message = session
            .handle_command(&command(CommandType::List), &mut console)
            .await;
        assert_eq!(message, "No tables found in the database.");
    }

    #[tokio::test]
    async fn test_query_error_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir).await;
        let mut console = ScriptedConsole::new(["SELECT * FROM nowhere"]);

        let message = session
            .handle_command(&command(CommandType::Query), &mut console)
            .await;

        assert!(message.starts_with("Error executing query:"));
        assert!(message.contains("error_log.txt for details."));
        let log = std::fs::read_to_string(session.error_log().path()).unwrap();
        assert!(log.contains("An error occurred while executing query:"));
        assert!(log.contains("no such table"));
    }

    #[tokio::test]
    async fn test_blank_query_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir).await;
        let mut console = ScriptedConsole::new(["   "]);

        let message = session
            .handle_command(&command(CommandType::Query), &mut console)
            .await;
        assert_eq!(message, "No query entered.");
        assert!(!session.error_log().path().exists());
    }

    #[tokio::test]
    async fn test_aiquery_without_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir).await;
        let mut console = ScriptedConsole::default();

        let message = session
            .handle_command(&command(CommandType::AiQuery), &mut console)
            .await;
        assert!(message.contains("OPENAI_API_KEY"));
        assert!(console.prompts.is_empty());
        assert!(!session.has_bridge());
    }

    #[tokio::test]
    async fn test_failed_confirmation_does_not_execute() {
        let dir = tempfile::tempdir().unwrap();
        let manager = DatabaseManager::open_in_memory().await.unwrap();
        manager.execute("CREATE TABLE kept (x INTEGER)").await.unwrap();
        let bridge = SqlBridge::new(Box::new(DropTableProvider), GenerationParams::new());
        let mut session = Session::new(
            manager,
            ErrorLog::new(dir.path().join("error_log.txt")),
            Some(bridge),
        );
        let mut console = BrokenAfterFirst { answered: false };

        let message = session
            .handle_command(&command(CommandType::AiQuery), &mut console)
            .await;

        assert_eq!(message, "Query not executed.");
        assert!(session.manager().table_exists("kept").await.unwrap());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir).await;
        let missing = dir.path().join("missing.csv");
        let mut console = ScriptedConsole::new([missing.display().to_string(), "t".to_string()]);

        let message = session
            .handle_command(&command(CommandType::Load), &mut console)
            .await;
        assert!(message.starts_with("Error loading CSV:"));
        assert!(session.error_log().path().exists());
    }
}
