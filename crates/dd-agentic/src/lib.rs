//! LLM provider clients for design token generation
//!
//! This crate only knows how to talk to text-generation services. Prompt
//! construction and validation of the reply live in the main crate.
//!
//! ## Backend Selection
//!
//! Set `AGENT_BACKEND` environment variable:
//! - `openai` (default): OpenAI chat completions with JSON mode
//! - `anthropic`: Anthropic Claude messages API

pub mod anthropic_client;
pub mod backend;
pub mod client_factory;
pub mod error;
pub mod llm_client;
pub mod openai_client;

// Re-exports for convenience
pub use backend::AgentBackend;
pub use client_factory::create_llm_client;
pub use error::LlmError;
pub use llm_client::{CompletionOptions, LlmClient};
