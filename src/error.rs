//! Error taxonomy for the design token pipeline
//!
//! Every variant carries a message that is safe to show to the end user
//! verbatim, except [`DesignError::Upstream`], whose detail is only logged.

use dd_agentic::LlmError;
use thiserror::Error;

/// Message shown for failures whose detail must stay in the logs
pub const GENERIC_FAILURE: &str = "Failed to generate design";

#[derive(Error, Debug)]
pub enum DesignError {
    #[error("Valid prompt is required")]
    InvalidPrompt,

    #[error("API key not configured: {0}")]
    ServiceUnavailable(String),

    #[error("AI returned invalid design tokens: {0}")]
    MalformedResponse(String),

    #[error("AI returned incomplete design tokens: missing '{section}'")]
    IncompleteTokens { section: &'static str },

    #[error("Invalid color for {field}: '{value}'")]
    InvalidColor { field: String, value: String },

    #[error("Invalid value for {field}: '{value}'")]
    InvalidEnum { field: String, value: String },

    #[error("Invalid font family: '{value}'")]
    InvalidFontFamily { value: String },

    #[error("Could not load theme: {0}")]
    DecodeFailure(String),

    #[error("A design is already being generated")]
    GenerationInProgress,

    #[error("The design was replaced before generation finished")]
    Superseded,

    #[error("Upstream generation failed: {0}")]
    Upstream(#[source] LlmError),
}

impl DesignError {
    /// Text for the end user. Upstream details are replaced by a generic
    /// message; callers log the full error separately.
    pub fn user_message(&self) -> String {
        match self {
            DesignError::Upstream(_) => GENERIC_FAILURE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<LlmError> for DesignError {
    fn from(error: LlmError) -> Self {
        if error.is_configuration() {
            DesignError::ServiceUnavailable(error.to_string())
        } else {
            DesignError::Upstream(error)
        }
    }
}

pub type DesignResult<T> = Result<T, DesignError>;
