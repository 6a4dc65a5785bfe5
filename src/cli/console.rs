//! Console abstraction
//!
//! Commands read their follow-up answers (file paths, table names, SQL,
//! confirmations) and print interim output through a [`Console`], so the
//! same handlers run against the interactive editor or a scripted input.

use crate::error::Result;
use crate::ingest::loader::{ConflictAction, ConflictResolver};
use std::collections::VecDeque;

/// Line-oriented user interaction
pub trait Console {
    /// Show `message` and read one line; `None` means the input was closed
    /// or the prompt was cancelled
    fn prompt(&mut self, message: &str) -> Result<Option<String>>;

    /// Print a block of output
    fn print(&mut self, text: &str);
}

/// Console fed from a fixed list of answers that records all output
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    /// Prompts shown, in order
    pub prompts: Vec<String>,
    /// Printed output, in order
    pub output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            output: Vec::new(),
        }
    }
}

impl Console for ScriptedConsole {
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        self.prompts.push(message.to_string());
        Ok(self.answers.pop_front())
    }

    fn print(&mut self, text: &str) {
        self.output.push(text.to_string());
    }
}

/// Asks the user how to handle a load into an existing table
pub struct PromptConflictResolver<'a> {
    console: &'a mut dyn Console,
}

impl<'a> PromptConflictResolver<'a> {
    pub fn new(console: &'a mut dyn Console) -> Self {
        Self { console }
    }
}

impl ConflictResolver for PromptConflictResolver<'_> {
    fn resolve(&mut self, table_name: &str) -> Result<ConflictAction> {
        let question = format!(
            "Table '{}' already exists. Choose an action [overwrite/rename/skip]: ",
            table_name
        );

        loop {
            let Some(answer) = self.console.prompt(&question)? else {
                return Ok(ConflictAction::Skip);
            };

            match answer.trim().to_lowercase().as_str() {
                "overwrite" | "o" => return Ok(ConflictAction::Overwrite),
                "skip" | "s" => return Ok(ConflictAction::Skip),
                "rename" | "r" => loop {
                    let Some(new_name) = self.console.prompt("Enter the new table name: ")? else {
                        return Ok(ConflictAction::Skip);
                    };
                    let new_name = new_name.trim();
                    if !new_name.is_empty() {
                        return Ok(ConflictAction::Rename(new_name.to_string()));
                    }
                    self.console.print("The table name cannot be empty.");
                },
                _ => self
                    .console
                    .print("Please answer 'overwrite', 'rename' or 'skip'."),
            }
        }
    }
}
