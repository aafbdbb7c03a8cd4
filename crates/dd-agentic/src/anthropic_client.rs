//! Anthropic Client
//!
//! LLM client implementation for Anthropic Claude API.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::LlmError;
use crate::llm_client::{CompletionOptions, LlmClient};

/// Default Anthropic model
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const PROVIDER: &str = "Anthropic";

/// Anthropic Claude API client
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
    base_url: String,
    options: CompletionOptions,
}

impl AnthropicClient {
    /// Create a new Anthropic client with the given API key
    pub fn new(api_key: String, options: CompletionOptions) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            options,
        }
    }

    /// Use a specific model
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Point at an Anthropic-compatible endpoint (proxy, gateway)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Internal API call implementation
    async fn call_api(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": &self.model,
                "max_tokens": self.options.max_tokens,
                "temperature": self.options.temperature,
                "system": system_prompt,
                "messages": [{"role": "user", "content": user_prompt}]
            }))
            .send()
            .await
            .map_err(|source| LlmError::Transport {
                provider: PROVIDER,
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                provider: PROVIDER,
                status,
                body,
            });
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            text: Option<String>,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            content: Vec<ContentBlock>,
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| LlmError::InvalidEnvelope {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        api_response
            .content
            .into_iter()
            .find_map(|c| c.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyResponse(PROVIDER))
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        // Anthropic doesn't have json_object mode, rely on prompt engineering
        let json_system = format!(
            "{}\n\nIMPORTANT: Respond with valid JSON only. No markdown code blocks, no explanations.",
            system_prompt
        );
        self.call_api(&json_system, user_prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let client = AnthropicClient::new("test-key".to_string(), CompletionOptions::default());
        assert_eq!(client.model_name(), DEFAULT_MODEL);
        assert_eq!(client.provider_name(), "Anthropic");
    }

    #[test]
    fn test_with_model() {
        let client = AnthropicClient::new("test-key".to_string(), CompletionOptions::default())
            .with_model("claude-3-opus");
        assert_eq!(client.model_name(), "claude-3-opus");
    }

    #[test]
    fn test_base_url_trims_slash() {
        let client = AnthropicClient::new("k".to_string(), CompletionOptions::default())
            .with_base_url("https://gateway.internal/anthropic/v1/");
        assert_eq!(client.base_url, "https://gateway.internal/anthropic/v1");
    }
}
