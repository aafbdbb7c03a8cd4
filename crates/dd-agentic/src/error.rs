//! Provider error types

use thiserror::Error;

/// Failure talking to a text-generation provider
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0} environment variable not set")]
    MissingApiKey(&'static str),

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {provider} response: {message}")]
    InvalidEnvelope {
        provider: &'static str,
        message: String,
    },

    #[error("Empty response from {0}")]
    EmptyResponse(&'static str),
}

impl LlmError {
    /// True when the provider could not be reached or configured at all,
    /// as opposed to a request that reached it and failed
    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmError::MissingApiKey(_))
    }
}
