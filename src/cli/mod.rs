//! CLI module
//!
//! This module provides the command-line interface for the SQLite assistant,
//! including the REPL implementation and command handlers.

pub mod commands;
pub mod console;
pub mod repl;
pub mod session;

// Re-exports
pub use commands::{Command, CommandType};
pub use console::{Console, PromptConflictResolver, ScriptedConsole};
pub use repl::Repl;
pub use session::Session;
