//! Client Factory
//!
//! Builds the configured provider client behind `Arc<dyn LlmClient>`.

use std::sync::Arc;

use crate::anthropic_client::AnthropicClient;
use crate::backend::AgentBackend;
use crate::error::LlmError;
use crate::llm_client::{CompletionOptions, LlmClient};
use crate::openai_client::OpenAiClient;

/// Create a client for `backend`.
///
/// `api_key` is passed in rather than read here so that a missing key is
/// reported per request instead of aborting startup. `model` and `base_url`
/// override the provider defaults.
pub fn create_llm_client(
    backend: AgentBackend,
    api_key: Option<&str>,
    model: Option<&str>,
    base_url: Option<&str>,
    options: CompletionOptions,
) -> Result<Arc<dyn LlmClient>, LlmError> {
    let api_key = api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or(LlmError::MissingApiKey(backend.api_key_var()))?
        .to_string();

    let client: Arc<dyn LlmClient> = match backend {
        AgentBackend::OpenAi => {
            let mut client = OpenAiClient::new(api_key, options);
            if let Some(model) = model {
                client = client.with_model(model);
            }
            if let Some(base_url) = base_url {
                client = client.with_base_url(base_url);
            }
            Arc::new(client)
        }
        AgentBackend::Anthropic => {
            let mut client = AnthropicClient::new(api_key, options);
            if let Some(model) = model {
                client = client.with_model(model);
            }
            if let Some(base_url) = base_url {
                client = client.with_base_url(base_url);
            }
            Arc::new(client)
        }
    };

    tracing::info!(
        provider = client.provider_name(),
        model = client.model_name(),
        "LLM client created"
    );
    Ok(client)
}
