//! REPL implementation
//!
//! This module implements the interactive command loop on top of rustyline.

use crate::cli::commands::{invalid_command_message, Command, CommandType};
use crate::cli::console::Console;
use crate::cli::session::Session;
use crate::error::{AssistantError, Result};
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::Context;
use rustyline::Helper;
use rustyline::{CompletionType, Config, Editor};
use std::path::PathBuf;

/// Completes command names, then falls back to file paths
pub struct AssistantHelper {
    files: FilenameCompleter,
}

impl AssistantHelper {
    fn new() -> Self {
        Self {
            files: FilenameCompleter::new(),
        }
    }
}

impl Completer for AssistantHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> std::result::Result<(usize, Vec<Pair>), ReadlineError> {
        let typed = &line[..pos];
        if !typed.contains(char::is_whitespace) {
            let typed = typed.to_lowercase();
            let matches: Vec<Pair> = CommandType::ALL
                .iter()
                .map(|(word, _)| *word)
                .filter(|word| word.starts_with(&typed))
                .map(|word| Pair {
                    display: word.to_string(),
                    replacement: word.to_string(),
                })
                .collect();
            if !matches.is_empty() {
                return Ok((0, matches));
            }
        }

        self.files.complete(line, pos, ctx)
    }
}

impl Hinter for AssistantHelper {
    type Hint = String;
}

impl Highlighter for AssistantHelper {}

impl Validator for AssistantHelper {}

impl Helper for AssistantHelper {}

type AssistantEditor = Editor<AssistantHelper, DefaultHistory>;

/// Follow-up prompts read from the same editor; cancelling answers `None`
impl Console for AssistantEditor {
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        match self.readline(message) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(readline_error(err)),
        }
    }

    fn print(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// SQLite assistant REPL
pub struct Repl {
    /// The rustyline editor
    editor: AssistantEditor,
    /// Whether the REPL should continue running
    running: bool,
    /// Command state
    session: Session,
    history_path: PathBuf,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(session: Session) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .auto_add_history(false)
            .build();

        let mut editor = AssistantEditor::with_config(config).map_err(readline_error)?;
        editor.set_helper(Some(AssistantHelper::new()));

        let history_path = history_path();
        if let Err(e) = editor.load_history(&history_path) {
            // Missing on first run
            tracing::debug!(path = %history_path.display(), error = %e, "No history loaded");
        }

        Ok(Self {
            editor,
            running: true,
            session,
            history_path,
        })
    }

    /// Run the REPL loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        while self.running {
            match self.editor.readline("Enter a command: ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    // History failure is non-critical
                    let _ = self.editor.add_history_entry(line);

                    match Command::parse(line) {
                        Ok(command) => self.handle_command(command).await,
                        Err(_) => println!("{}", invalid_command_message()),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    self.running = false;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    self.running = false;
                }
            }
        }

        self.save_history();
        self.session.close().await;
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("SQLite Assistant v{}", env!("CARGO_PKG_VERSION"));
        println!("Database: {}", self.session.manager().location());
        if !self.session.has_bridge() {
            println!("Note: aiquery is disabled until OPENAI_API_KEY is set.");
        }
        println!();
        println!("Type 'help' for a list of commands.");
        println!();
    }

    async fn handle_command(&mut self, command: Command) {
        let message = self
            .session
            .handle_command(&command, &mut self.editor)
            .await;
        println!("{}", message);

        if command.command_type == CommandType::Exit {
            self.running = false;
        }
    }

    fn save_history(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "Could not create history directory");
                return;
            }
        }
        if let Err(e) = self.editor.save_history(&self.history_path) {
            tracing::warn!(error = %e, "Could not save history");
        }
    }
}

fn history_path() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".sqlite-assistant").join("history"))
        .unwrap_or_else(|| ".sqlite-assistant-history".into())
}

fn readline_error(err: ReadlineError) -> AssistantError {
    AssistantError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("Line editor failed: {}", err),
    ))
}
