//! Command parsing for the CLI
//!
//! This module turns a line typed at the command prompt into a [`Command`].

use crate::error::{AssistantError, Result};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    /// Load a CSV file into a table
    Load,
    /// Run a raw SQL statement
    Query,
    /// List the tables in the store
    List,
    /// Translate a plain-language request into SQL
    AiQuery,
    /// Show help message
    Help,
    /// Exit the application
    Exit,
}

impl CommandType {
    /// Every command with the word that selects it
    pub const ALL: [(&'static str, CommandType); 6] = [
        ("load", CommandType::Load),
        ("query", CommandType::Query),
        ("list", CommandType::List),
        ("aiquery", CommandType::AiQuery),
        ("help", CommandType::Help),
        ("exit", CommandType::Exit),
    ];

    /// The word typed to run this command
    pub fn keyword(&self) -> &'static str {
        match self {
            CommandType::Load => "load",
            CommandType::Query => "query",
            CommandType::List => "list",
            CommandType::AiQuery => "aiquery",
            CommandType::Help => "help",
            CommandType::Exit => "exit",
        }
    }
}

/// Parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The type of command
    pub command_type: CommandType,
}

impl Command {
    /// Parse a command from user input (trimmed, case-insensitive)
    pub fn parse(input: &str) -> Result<Self> {
        let word = input.trim().to_lowercase();

        let command_type = match word.as_str() {
            "load" => CommandType::Load,
            "query" => CommandType::Query,
            "list" => CommandType::List,
            "aiquery" => CommandType::AiQuery,
            "help" => CommandType::Help,
            "exit" | "quit" => CommandType::Exit,
            _ => return Err(AssistantError::UnknownCommand(word)),
        };

        Ok(Command { command_type })
    }
}

/// Text printed by the `help` command
pub fn help_text() -> &'static str {
    "Available commands:
  load    - Load a CSV file into a new or existing table.
  query   - Run a SQL query (e.g., SELECT * FROM table).
  list    - List all tables in the database.
  aiquery - Describe what you want in plain English and get a suggested SQL query.
  help    - Show this list of commands.
  exit    - Exit the application."
}

/// Message shown for anything that is not a command
pub fn invalid_command_message() -> &'static str {
    "Invalid command. Type 'help' for a list of commands."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        for (word, expected) in CommandType::ALL {
            let cmd = Command::parse(word).unwrap();
            assert_eq!(cmd.command_type, expected);
            assert_eq!(expected.keyword(), word);
        }
    }

    #[test]
    fn test_parse_is_trimmed_and_case_insensitive() {
        let cmd = Command::parse("  LoAd \n").unwrap();
        assert_eq!(cmd.command_type, CommandType::Load);

        let cmd = Command::parse("AIQUERY").unwrap();
        assert_eq!(cmd.command_type, CommandType::AiQuery);
    }

    #[test]
    fn test_parse_quit_alias() {
        let cmd = Command::parse("quit").unwrap();
        assert_eq!(cmd.command_type, CommandType::Exit);
    }

    #[test]
    fn test_parse_invalid_command() {
        let result = Command::parse("select * from t");
        assert!(matches!(result, Err(AssistantError::UnknownCommand(_))));

        let result = Command::parse("/load");
        assert!(result.is_err());
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help_text();
        for (word, _) in CommandType::ALL {
            assert!(help.contains(word), "help is missing {}", word);
        }
    }
}
