//! Runtime configuration
//!
//! Reads config from env vars (after `.env` is loaded by the binary):
//!   DESIGN_BIND_ADDR        - listen address (default: 0.0.0.0:3000)
//!   AGENT_BACKEND           - openai (default) | anthropic
//!   OPENAI_API_KEY / ANTHROPIC_API_KEY - provider credential (optional at startup)
//!   OPENAI_MODEL / ANTHROPIC_MODEL     - model override
//!   OPENAI_BASE_URL / ANTHROPIC_BASE_URL - compatible endpoint (proxy, gateway)
//!   DESIGN_TEMPERATURE      - sampling temperature (default: 0.7)
//!   DESIGN_MAX_TOKENS       - output token cap (default: 1500)
//!   DESIGN_VALIDATION_MODE  - lenient (default) | strict
//!   DESIGN_PUBLIC_URL       - base for shareable links (default: http://localhost:3000/)

use dd_agentic::{AgentBackend, CompletionOptions};
use thiserror::Error;
use url::Url;

use crate::validator::ValidationMode;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {var} '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct DesignConfig {
    pub bind_addr: String,
    pub backend: AgentBackend,
    /// Absent keys are reported per request as `ServiceUnavailable`
    pub api_key: Option<String>,
    pub model: Option<String>,
    /// Provider endpoint override; validated as a URL
    pub base_url: Option<Url>,
    pub completion: CompletionOptions,
    pub validation_mode: ValidationMode,
    pub public_url: Url,
}

impl DesignConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let backend = match get("AGENT_BACKEND") {
            Some(value) => value.parse().map_err(|e: dd_agentic::backend::ParseBackendError| {
                ConfigError::Invalid {
                    var: "AGENT_BACKEND",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => AgentBackend::default(),
        };

        let mut completion = CompletionOptions::default();
        if let Some(value) = get("DESIGN_TEMPERATURE") {
            let temperature: f32 = value.parse().map_err(|_| ConfigError::Invalid {
                var: "DESIGN_TEMPERATURE",
                value: value.clone(),
                reason: "not a number".into(),
            })?;
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::Invalid {
                    var: "DESIGN_TEMPERATURE",
                    value,
                    reason: "must be between 0 and 2".into(),
                });
            }
            completion.temperature = temperature;
        }
        if let Some(value) = get("DESIGN_MAX_TOKENS") {
            completion.max_tokens = match value.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DESIGN_MAX_TOKENS",
                        value,
                        reason: "must be a positive integer".into(),
                    })
                }
            };
        }

        let validation_mode = match get("DESIGN_VALIDATION_MODE") {
            Some(value) => value.parse().map_err(|reason: String| ConfigError::Invalid {
                var: "DESIGN_VALIDATION_MODE",
                value: value.clone(),
                reason,
            })?,
            None => ValidationMode::default(),
        };

        let public_url = get("DESIGN_PUBLIC_URL").unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string());
        let public_url = Url::parse(&public_url).map_err(|e| ConfigError::Invalid {
            var: "DESIGN_PUBLIC_URL",
            value: public_url.clone(),
            reason: e.to_string(),
        })?;

        let base_url = match get(backend.base_url_var()) {
            Some(value) => Some(Url::parse(&value).map_err(|e| ConfigError::Invalid {
                var: backend.base_url_var(),
                value: value.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            bind_addr: get("DESIGN_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            backend,
            api_key: get(backend.api_key_var()),
            model: get(backend.model_var()),
            base_url,
            completion,
            validation_mode,
            public_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<DesignConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DesignConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.backend, AgentBackend::OpenAi);
        assert!(config.api_key.is_none());
        assert!(config.base_url.is_none());
        assert_eq!(config.completion, CompletionOptions::default());
        assert_eq!(config.validation_mode, ValidationMode::Lenient);
        assert_eq!(config.public_url.as_str(), DEFAULT_PUBLIC_URL);
    }

    #[test]
    fn test_key_follows_backend() {
        let config = config_from(&[
            ("AGENT_BACKEND", "claude"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("ANTHROPIC_MODEL", "claude-3-opus"),
        ])
        .unwrap();
        assert_eq!(config.backend, AgentBackend::Anthropic);
        assert_eq!(config.api_key.as_deref(), Some("sk-ant"));
        assert_eq!(config.model.as_deref(), Some("claude-3-opus"));
    }

    #[test]
    fn test_base_url_follows_backend() {
        let config = config_from(&[
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("ANTHROPIC_BASE_URL", "http://localhost:9090/v1"),
        ])
        .unwrap();
        assert_eq!(
            config.base_url.as_ref().map(Url::as_str),
            Some("http://localhost:8080/v1")
        );

        let err = config_from(&[("AGENT_BACKEND", "anthropic"), ("ANTHROPIC_BASE_URL", "gateway")])
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid ANTHROPIC_BASE_URL 'gateway'"));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        assert!(config_from(&[("AGENT_BACKEND", "llama")]).is_err());
        assert!(config_from(&[("DESIGN_TEMPERATURE", "hot")]).is_err());
        assert!(config_from(&[("DESIGN_TEMPERATURE", "3.5")]).is_err());
        assert!(config_from(&[("DESIGN_MAX_TOKENS", "0")]).is_err());
        assert!(config_from(&[("DESIGN_VALIDATION_MODE", "loose")]).is_err());
        assert!(config_from(&[("DESIGN_PUBLIC_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_strict_mode_and_overrides() {
        let config = config_from(&[
            ("DESIGN_VALIDATION_MODE", "strict"),
            ("DESIGN_TEMPERATURE", "0.2"),
            ("DESIGN_MAX_TOKENS", "800"),
        ])
        .unwrap();
        assert_eq!(config.validation_mode, ValidationMode::Strict);
        assert_eq!(config.completion.max_tokens, 800);
        assert!((config.completion.temperature - 0.2).abs() < f32::EPSILON);
    }
}
