//! Configuration Storage
//!
//! This module reads the optional on-disk configuration file. Every field is
//! optional; missing fields fall back to the built-in defaults.

use crate::error::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name
const CONFIG_FILE: &str = "config.toml";

/// Application directory name under the platform config dir
const APP_DIR: &str = "sqlite-assistant";

/// Persistent configuration data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Path of the SQLite store
    pub database_path: Option<PathBuf>,
    /// Path of the append-only error log
    pub error_log_path: Option<PathBuf>,
    /// Diagnostic log filter (e.g. "warn", "sqlite_assistant=debug")
    pub log_level: Option<String>,
    /// Language model settings
    pub llm: LlmSection,
}

/// `[llm]` table of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// API key (the environment variable takes precedence)
    pub api_key: Option<String>,
    /// Model identifier
    pub model: Option<String>,
    /// Chat completions endpoint
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl ConfigFile {
    /// Get the configuration file path
    pub fn config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration from the default location
    ///
    /// A missing file (or a platform without a config dir) yields the empty
    /// configuration.
    pub fn load() -> Result<Self> {
        match Self::config_file() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| {
            AssistantError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let config = ConfigFile::parse(
            r#"
            database_path = "data/sales.db"
            log_level = "debug"

            [llm]
            model = "gpt-4o-mini"
            max_tokens = 300
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, Some(PathBuf::from("data/sales.db")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.llm.max_tokens, Some(300));
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_parse_empty_file() {
        let config = ConfigFile::parse("").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_from_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "database_path = [").unwrap();

        let result = ConfigFile::load_from(&path);
        assert!(matches!(result, Err(AssistantError::Config(_))));
    }
}
