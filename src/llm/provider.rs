//! LLM Provider Trait
//!
//! This module defines the trait-based abstraction for LLM providers so the
//! SQL bridge can talk to any chat-completion service (or a stub in tests).

use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// LLM message role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageRole {
    /// System message (sets behavior/context)
    System,
    /// User message (query or input)
    User,
}

/// LLM message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: MessageRole,
    /// Message content
    pub content: String,
}

impl Message {
    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// LLM response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    /// Generated text content
    pub content: String,
    /// Number of tokens used (input)
    pub input_tokens: Option<u32>,
    /// Number of tokens used (output)
    pub output_tokens: Option<u32>,
    /// Model used for generation
    pub model: Option<String>,
    /// Finish reason (e.g., "stop", "length")
    pub finish_reason: Option<String>,
}

impl LLMResponse {
    /// Create a new response
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            input_tokens: None,
            output_tokens: None,
            model: None,
            finish_reason: None,
        }
    }
}

/// LLM generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic)
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: crate::config::DEFAULT_MAX_TOKENS,
            temperature: 0.0,
        }
    }
}

impl GenerationParams {
    /// Create new default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Request one completion for a conversation
    async fn generate(&self, messages: &[Message], params: &GenerationParams)
        -> Result<LLMResponse>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Check if the provider has an API key configured
    fn has_api_key(&self) -> bool;

    /// Validate the provider configuration
    fn validate_config(&self) -> Result<()> {
        if !self.has_api_key() {
            return Err(AssistantError::LLMApiKeyMissing(
                self.provider_name().to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KeylessProvider;

    #[async_trait]
    impl LLMProvider for KeylessProvider {
        async fn generate(
            &self,
            _messages: &[Message],
            _params: &GenerationParams,
        ) -> Result<LLMResponse> {
            Ok(LLMResponse::new(""))
        }

        fn provider_name(&self) -> &str {
            "Keyless"
        }

        fn has_api_key(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_message_creation() {
        let system_msg = Message::system("You are a helpful assistant");
        assert_eq!(system_msg.role, MessageRole::System);

        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.role, MessageRole::User);
    }

    #[test]
    fn test_generation_params_default() {
        let params = GenerationParams::new();
        assert_eq!(params.max_tokens, 200);
        assert_eq!(params.temperature, 0.0);
    }

    #[test]
    fn test_generation_params_builder() {
        let params = GenerationParams::new()
            .with_max_tokens(512)
            .with_temperature(0.5);

        assert_eq!(params.max_tokens, 512);
        assert_eq!(params.temperature, 0.5);
    }

    #[test]
    fn test_validate_config_requires_key() {
        let result = KeylessProvider.validate_config();
        assert!(matches!(result, Err(AssistantError::LLMApiKeyMissing(name)) if name == "Keyless"));
    }
}
