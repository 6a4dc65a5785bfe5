//! LLM HTTP Client
//!
//! This module provides the HTTP client used to call LLM APIs. Each call is a
//! single attempt; failures are returned to the caller as they are.

use crate::error::{AssistantError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;

/// HTTP client for LLM API requests
#[derive(Clone)]
pub struct LLMHttpClient {
    /// Reqwest HTTP client
    client: Client,
    /// Provider name used in error messages
    provider: String,
}

impl LLMHttpClient {
    /// Create a new HTTP client
    pub fn new(provider: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            provider: provider.into(),
        })
    }

    /// POST a JSON body and return the response body as text
    pub async fn post_json<T: Serialize>(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &T,
    ) -> Result<String> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(AssistantError::LLMApiError {
                provider: self.provider.clone(),
                message: text,
                status: status.as_u16(),
            });
        }

        Ok(text)
    }

    /// Build standard bearer-token headers for API requests
    pub fn build_headers(api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            AssistantError::Config("API key contains characters not allowed in a header".into())
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        Ok(headers)
    }
}
