//! LLM Client Trait
//!
//! Unified interface for LLM providers (OpenAI, Anthropic).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Default sampling temperature: enough variation for creative palettes
/// while keeping the JSON structure reliable
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default cap on output tokens; a full token set is well under this
pub const DEFAULT_MAX_TOKENS: u32 = 1500;

/// Sampling settings sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Unified LLM client interface for both OpenAI and Anthropic
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Call the LLM expecting JSON response
    /// - For OpenAI: uses response_format json_object mode
    /// - For Anthropic: adds JSON instruction to system prompt
    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;

    /// Get the model name for logging
    fn model_name(&self) -> &str;

    /// Get the provider name for logging
    fn provider_name(&self) -> &str;
}
