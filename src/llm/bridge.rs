//! Natural-language to SQL bridge
//!
//! Builds the fixed prompt from a schema snapshot and a plain-language
//! request, asks the provider for one completion and extracts the SQL.

use crate::config::LlmSettings;
use crate::database::schema::SchemaSnapshot;
use crate::error::{AssistantError, Result};
use crate::llm::provider::{GenerationParams, LLMProvider, Message};
use crate::llm::providers::openai::OpenAIProvider;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that outputs valid SQL based on the user's request.";

/// Translates plain-language requests into SQL suggestions
pub struct SqlBridge {
    provider: Box<dyn LLMProvider>,
    params: GenerationParams,
}

impl SqlBridge {
    /// Create a bridge over any provider
    pub fn new(provider: Box<dyn LLMProvider>, params: GenerationParams) -> Self {
        Self { provider, params }
    }

    /// Build the OpenAI-backed bridge; `None` when no API key is configured
    pub fn from_settings(settings: &LlmSettings) -> Result<Option<Self>> {
        let params = GenerationParams::new()
            .with_max_tokens(settings.max_tokens)
            .with_temperature(settings.temperature);

        Ok(OpenAIProvider::from_settings(settings)?
            .map(|provider| Self::new(Box::new(provider), params)))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Ask the model for a SQL statement answering `request`
    pub async fn suggest_sql(&self, snapshot: &SchemaSnapshot, request: &str) -> Result<String> {
        if snapshot.is_empty() {
            tracing::warn!("No tables loaded; the suggestion cannot reference any data");
        }
        tracing::debug!(tables = ?snapshot.table_names(), "Requesting SQL suggestion");
        let messages = build_messages(&snapshot.format_for_llm(), request);
        let response = self.provider.generate(&messages, &self.params).await?;

        let sql = extract_sql(&response.content);
        if sql.is_empty() {
            return Err(AssistantError::EmptyCompletion);
        }
        tracing::info!(
            provider = self.provider_name(),
            model = response.model.as_deref().unwrap_or("unknown"),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Received SQL suggestion"
        );
        if response.finish_reason.as_deref() == Some("length") {
            tracing::warn!(
                max_tokens = self.params.max_tokens,
                "Completion hit the token limit; the suggested SQL may be cut off"
            );
        }
        Ok(sql)
    }
}

/// System/user prompt pair for one request
pub fn build_messages(schema: &str, request: &str) -> Vec<Message> {
    let prompt = format!(
        "You are a helpful assistant that can translate natural language into SQL queries for a SQLite database.\n\
         Here is the database schema:\n\
         {}\n\
         The user wants: {}\n\n\
         Return ONLY the SQL query you think best answers the user's request.",
        schema, request
    );

    vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)]
}

/// Strip whitespace and a surrounding markdown code fence from a completion
pub fn extract_sql(content: &str) -> String {
    let trimmed = content.trim();
    let Some(fenced) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the info string (e.g. "sql") on the opening fence line
    let body = match fenced.find('\n') {
        Some(newline) => &fenced[newline + 1..],
        None => fenced,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::{Column, Table};
    use crate::llm::provider::{LLMResponse, MessageRole};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Returns a canned completion and keeps the messages it was sent
    struct CannedProvider {
        reply: String,
        seen: Arc<Mutex<Vec<Message>>>,
    }

    #[async_trait]
    impl LLMProvider for CannedProvider {
        async fn generate(
            &self,
            messages: &[Message],
            _params: &GenerationParams,
        ) -> Result<LLMResponse> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            Ok(LLMResponse::new(self.reply.clone()))
        }

        fn provider_name(&self) -> &str {
            "Canned"
        }

        fn has_api_key(&self) -> bool {
            true
        }
    }

    fn bridge(reply: &str) -> (SqlBridge, Arc<Mutex<Vec<Message>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let provider = CannedProvider {
            reply: reply.to_string(),
            seen: seen.clone(),
        };
        (SqlBridge::new(Box::new(provider), GenerationParams::new()), seen)
    }

    fn snapshot() -> SchemaSnapshot {
        let mut table = Table::new("sales");
        table.add_column(Column::new("region", "TEXT"));
        table.add_column(Column::new("amount", "FLOAT"));
        let mut snapshot = SchemaSnapshot::new();
        snapshot.add_table(table);
        snapshot
    }

    #[test]
    fn test_build_messages() {
        let messages = build_messages("Table: t\nColumns:\n    - a (TEXT)\n\n", "all rows");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, MessageRole::User);
        assert!(messages[1].content.contains("for a SQLite database"));
        assert!(messages[1].content.contains("    - a (TEXT)"));
        assert!(messages[1].content.contains("The user wants: all rows"));
        assert!(messages[1].content.ends_with("best answers the user's request."));
    }

    #[test]
    fn test_extract_sql() {
        assert_eq!(extract_sql("  SELECT 1;\n"), "SELECT 1;");
        assert_eq!(extract_sql("```sql\nSELECT *\nFROM t;\n```"), "SELECT *\nFROM t;");
        assert_eq!(extract_sql("```\nSELECT 2\n```\n"), "SELECT 2");
        assert_eq!(extract_sql("```SELECT 3```"), "SELECT 3");
        assert_eq!(extract_sql(""), "");
    }

    #[tokio::test]
    async fn test_suggest_sql_sends_schema() {
        let (bridge, seen) = bridge("```sql\nSELECT region, SUM(amount) FROM sales GROUP BY region;\n```");

        let sql = bridge
            .suggest_sql(&snapshot(), "total sales per region")
            .await
            .unwrap();

        assert_eq!(sql, "SELECT region, SUM(amount) FROM sales GROUP BY region;");
        let seen = seen.lock().unwrap();
        assert!(seen[1].content.contains("Table: sales\nColumns:\n    - region (TEXT)"));
        assert!(seen[1].content.contains("The user wants: total sales per region"));
    }

    #[tokio::test]
    async fn test_empty_completion_is_an_error() {
        let (bridge, _) = bridge("   ");
        let result = bridge.suggest_sql(&snapshot(), "anything").await;
        assert!(matches!(result, Err(AssistantError::EmptyCompletion)));
    }

    #[test]
    fn test_from_settings_without_key() {
        let settings = LlmSettings::default();
        assert!(SqlBridge::from_settings(&settings).unwrap().is_none());
    }
}
