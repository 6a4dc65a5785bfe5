//! Configuration module
//!
//! This module resolves the application settings from built-in defaults, the
//! optional config file and the environment.

pub mod storage;

use crate::error::Result;
use std::path::PathBuf;
use storage::ConfigFile;

/// Default SQLite store path
pub const DEFAULT_DATABASE_PATH: &str = "defaultDB.db";

/// Default error log path
pub const DEFAULT_ERROR_LOG_PATH: &str = "error_log.txt";

/// Default diagnostic log filter
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default chat completions endpoint
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1/chat/completions";

/// Default completion budget for a single SQL suggestion
pub const DEFAULT_MAX_TOKENS: u32 = 200;

/// Environment variable names
pub mod env {
    pub const DATABASE: &str = "SQLITE_ASSISTANT_DB";
    pub const ERROR_LOG: &str = "SQLITE_ASSISTANT_ERROR_LOG";
    pub const MODEL: &str = "SQLITE_ASSISTANT_MODEL";
    pub const LOG_LEVEL: &str = "SQLITE_ASSISTANT_LOG";
    pub const API_KEY: &str = "OPENAI_API_KEY";
    pub const API_BASE: &str = "OPENAI_API_BASE";
}

/// Language model settings
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    /// API credential; `aiquery` is unavailable without it
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Chat completions endpoint
    pub api_base: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
        }
    }
}

/// Resolved application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Path of the SQLite store
    pub database_path: PathBuf,
    /// Path of the append-only error log
    pub error_log_path: PathBuf,
    /// Diagnostic log filter
    pub log_level: String,
    /// Language model settings
    pub llm: LlmSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            error_log_path: PathBuf::from(DEFAULT_ERROR_LOG_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            llm: LlmSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and the process environment
    ///
    /// A `.env` file in the working directory is honoured.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        let file = ConfigFile::load()?;
        Ok(Self::from_sources(file, |key| std::env::var(key).ok()))
    }

    /// Merge a config file with an environment lookup; the environment wins
    pub fn from_sources<F>(file: ConfigFile, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_path = var(env::DATABASE)
            .map(PathBuf::from)
            .or(file.database_path)
            .unwrap_or(defaults.database_path);

        let error_log_path = var(env::ERROR_LOG)
            .map(PathBuf::from)
            .or(file.error_log_path)
            .unwrap_or(defaults.error_log_path);

        let log_level = var(env::LOG_LEVEL)
            .or(file.log_level)
            .unwrap_or(defaults.log_level);

        let llm = LlmSettings {
            api_key: var(env::API_KEY).or(file.llm.api_key),
            model: var(env::MODEL)
                .or(file.llm.model)
                .unwrap_or(defaults.llm.model),
            api_base: var(env::API_BASE)
                .or(file.llm.api_base)
                .unwrap_or(defaults.llm.api_base),
            max_tokens: file.llm.max_tokens.unwrap_or(defaults.llm.max_tokens),
            temperature: file.llm.temperature.unwrap_or(defaults.llm.temperature),
        };

        Self {
            database_path,
            error_log_path,
            log_level,
            llm,
        }
    }
}
