//! Backend Selection
//!
//! Enum for selecting between LLM providers (OpenAI, Anthropic).

use std::str::FromStr;

/// LLM backend provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentBackend {
    /// OpenAI GPT (default)
    #[default]
    OpenAi,
    /// Anthropic Claude
    Anthropic,
}

impl AgentBackend {
    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            AgentBackend::OpenAi => "OpenAI",
            AgentBackend::Anthropic => "Anthropic",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            AgentBackend::OpenAi => "OPENAI_API_KEY",
            AgentBackend::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Environment variable overriding this provider's model
    pub fn model_var(&self) -> &'static str {
        match self {
            AgentBackend::OpenAi => "OPENAI_MODEL",
            AgentBackend::Anthropic => "ANTHROPIC_MODEL",
        }
    }

    /// Environment variable overriding this provider's API endpoint
    pub fn base_url_var(&self) -> &'static str {
        match self {
            AgentBackend::OpenAi => "OPENAI_BASE_URL",
            AgentBackend::Anthropic => "ANTHROPIC_BASE_URL",
        }
    }
}

/// Error type for parsing AgentBackend
#[derive(Debug)]
pub struct ParseBackendError(String);

impl std::fmt::Display for ParseBackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseBackendError {}

impl FromStr for AgentBackend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Ok(AgentBackend::OpenAi),
            "anthropic" | "claude" => Ok(AgentBackend::Anthropic),
            other => Err(ParseBackendError(format!(
                "Unknown AGENT_BACKEND '{}'. Valid values: openai, gpt, anthropic, claude",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AgentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
