//! OpenAI Client
//!
//! LLM client implementation for the OpenAI chat completions API.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::LlmError;
use crate::llm_client::{CompletionOptions, LlmClient};

/// Default OpenAI model
pub const DEFAULT_MODEL: &str = "gpt-4o";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const PROVIDER: &str = "OpenAI";

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
    base_url: String,
    options: CompletionOptions,
}

impl OpenAiClient {
    /// Create a new OpenAI client with the given API key
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

    /// Point at an OpenAI-compatible endpoint (proxy, gateway)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn request_body(&self, system_prompt: &str, user_prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "temperature": self.options.temperature,
            "max_tokens": self.options.max_tokens,
            "response_format": {"type": "json_object"}
        })
    }

    /// Internal API call implementation
    async fn call_api(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.request_body(system_prompt, user_prompt))
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
        struct Message {
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            choices: Vec<Choice>,
        }

        let api_response: ApiResponse =
            response
                .json()
                .await
                .map_err(|e| LlmError::InvalidEnvelope {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyResponse(PROVIDER))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        self.call_api(system_prompt, user_prompt).await
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
        let client = OpenAiClient::new("test-key".to_string(), CompletionOptions::default());
        assert_eq!(client.model_name(), DEFAULT_MODEL);
        assert_eq!(client.provider_name(), "OpenAI");
    }

    #[test]
    fn test_with_model() {
        let client = OpenAiClient::new("test-key".to_string(), CompletionOptions::default())
            .with_model("gpt-4o-mini");
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_json_mode_body() {
        let options = CompletionOptions {
            temperature: 0.7,
            max_tokens: 1500,
        };
        let client = OpenAiClient::new("test-key".to_string(), options);
        let body = client.request_body("system", "user");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
    }

    #[test]
    fn test_base_url_trims_slash() {
        let client = OpenAiClient::new("k".to_string(), CompletionOptions::default())
            .with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }
}
