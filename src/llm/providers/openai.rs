//! OpenAI API Provider
//!
//! This module implements the LLMProvider trait for OpenAI-compatible chat
//! completion endpoints.

use crate::config::LlmSettings;
use crate::error::Result;
use crate::llm::client::LLMHttpClient;
use crate::llm::provider::{GenerationParams, LLMProvider, LLMResponse, Message, MessageRole};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider name reported in errors
const PROVIDER_NAME: &str = "OpenAI";

/// OpenAI chat completions provider
pub struct OpenAIProvider {
    /// API key for authentication
    api_key: String,
    /// Model to use (e.g., "gpt-3.5-turbo")
    model: String,
    /// Chat completions endpoint
    api_base: String,
    /// HTTP client for making requests
    client: LLMHttpClient,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key
    /// * `model` - Model identifier
    /// * `api_base` - Chat completions endpoint URL
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            api_base: api_base.into(),
            client: LLMHttpClient::new(PROVIDER_NAME)?,
        })
    }

    /// Create a provider from the configured settings, if a key is present
    pub fn from_settings(settings: &LlmSettings) -> Result<Option<Self>> {
        match &settings.api_key {
            Some(key) => Self::new(key.clone(), settings.model.clone(), settings.api_base.clone())
                .map(Some),
            None => Ok(None),
        }
    }

    /// Convert our Message format to OpenAI format
    fn convert_messages_to_openai(&self, messages: &[Message]) -> Vec<OpenAIMessage> {
        messages
            .iter()
            .map(|msg| OpenAIMessage {
                role: match msg.role {
                    MessageRole::User => "user",
                    MessageRole::System => "system",
                }
                .to_string(),
                content: msg.content.clone(),
            })
            .collect()
    }

    fn build_request(&self, messages: &[Message], params: &GenerationParams) -> OpenAIRequest {
        OpenAIRequest {
            model: self.model.clone(),
            messages: self.convert_messages_to_openai(messages),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        }
    }

    /// Parse a response body into our response type
    fn parse_response(&self, body: &str) -> Result<LLMResponse> {
        let response: OpenAIResponse = serde_json::from_str(body)?;

        let choice = response.choices.into_iter().next();
        let content = choice
            .as_ref()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(LLMResponse {
            content,
            input_tokens: response.usage.as_ref().map(|u| u.prompt_tokens),
            output_tokens: response.usage.as_ref().map(|u| u.completion_tokens),
            model: response.model,
            finish_reason: choice.and_then(|c| c.finish_reason),
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn generate(
        &self,
        messages: &[Message],
        params: &GenerationParams,
    ) -> Result<LLMResponse> {
        self.validate_config()?;

        let request = self.build_request(messages, params);
        let headers = LLMHttpClient::build_headers(&self.api_key)?;

        tracing::debug!(model = %self.model, messages = messages.len(), "Requesting completion");
        let body = self
            .client
            .post_json(&self.api_base, headers, &request)
            .await?;

        self.parse_response(&body)
    }

    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
}

/// OpenAI API message format
#[derive(Debug, Serialize, Clone)]
struct OpenAIMessage {
    role: String,
    content: String,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

/// Choice in OpenAI response
#[derive(Debug, Deserialize, Clone)]
struct Choice {
    message: OpenAIMessageResponse,
    finish_reason: Option<String>,
}

/// Message in OpenAI response
#[derive(Debug, Deserialize, Clone)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize, Clone)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssistantError;

    fn provider() -> OpenAIProvider {
        OpenAIProvider::new("test-key", "gpt-3.5-turbo", "http://localhost/v1/chat/completions")
            .unwrap()
    }

    #[test]
    fn test_from_settings() {
        let mut settings = LlmSettings::default();
        assert!(OpenAIProvider::from_settings(&settings).unwrap().is_none());

        settings.api_key = Some("sk-test".to_string());
        let provider = OpenAIProvider::from_settings(&settings).unwrap().unwrap();
        assert_eq!(provider.build_request(&[], &GenerationParams::new()).model, "gpt-3.5-turbo");
        assert!(provider.has_api_key());
        assert_eq!(provider.provider_name(), "OpenAI");
    }

    #[test]
    fn test_request_serialization() {
        let provider = provider();
        let messages = vec![Message::system("be terse"), Message::user("count rows")];
        let request = provider.build_request(&messages, &GenerationParams::new());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    {"role": "system", "content": "be terse"},
                    {"role": "user", "content": "count rows"}
                ],
                "max_tokens": 200,
                "temperature": 0.0
            })
        );
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-3.5-turbo-0125",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "SELECT COUNT(*) FROM sales;"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 50, "completion_tokens": 8, "total_tokens": 58}
        }"#;

        let response = provider().parse_response(body).unwrap();
        assert_eq!(response.content, "SELECT COUNT(*) FROM sales;");
        assert_eq!(response.input_tokens, Some(50));
        assert_eq!(response.output_tokens, Some(8));
        assert_eq!(response.model.as_deref(), Some("gpt-3.5-turbo-0125"));
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_parse_response_without_choices() {
        let response = provider().parse_response(r#"{"choices": []}"#).unwrap();
        assert!(response.content.is_empty());
    }

    #[test]
    fn test_parse_invalid_response() {
        let result = provider().parse_response("<html>bad gateway</html>");
        assert!(matches!(result, Err(AssistantError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_generate_without_key_fails_early() {
        let provider = OpenAIProvider::new("", "gpt-3.5-turbo", "http://localhost").unwrap();
        let result = provider
            .generate(&[Message::user("hi")], &GenerationParams::new())
            .await;
        assert!(matches!(result, Err(AssistantError::LLMApiKeyMissing(_))));
    }
}
