//! Generation Client
//!
//! Sends a design prompt to the configured language model with a fixed
//! instruction set and turns the reply into a canonical token set.
//!
//! There is no automatic retry; a failed call surfaces as a typed error.

use std::sync::Arc;

use dd_agentic::LlmClient;
use dd_types::{enum_fields, DesignTokenSet, EnumField, Section, COLOR_KEYS};
use serde_json::Value;

use crate::error::{DesignError, DesignResult};
use crate::validator::{Normalized, Provenance, TokenNormalizer};

/// Longest slice of a raw model reply written to the debug log
const MAX_LOGGED_REPLY: usize = 1000;

/// Trimmed prompt, or `InvalidPrompt` when absent or blank
pub fn validate_prompt(prompt: Option<&str>) -> DesignResult<&str> {
    match prompt.map(str::trim) {
        Some(prompt) if !prompt.is_empty() => Ok(prompt),
        _ => Err(DesignError::InvalidPrompt),
    }
}

/// Design token generator backed by an [`LlmClient`]
pub struct DesignGenerator {
    client: Arc<dyn LlmClient>,
    normalizer: TokenNormalizer,
    system_prompt: String,
}

impl DesignGenerator {
    pub fn new(client: Arc<dyn LlmClient>, normalizer: TokenNormalizer) -> Self {
        Self {
            client,
            normalizer,
            system_prompt: build_system_prompt(),
        }
    }

    pub fn normalizer(&self) -> &TokenNormalizer {
        &self.normalizer
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    /// Fresh design from a prompt: new id, version 1
    pub async fn generate(&self, prompt: &str) -> DesignResult<Normalized> {
        let prompt = validate_prompt(Some(prompt))?;
        let raw = self.request(prompt).await?;
        self.normalizer
            .normalize(&raw, Provenance::Generated { prompt })
    }

    /// Variation of `parent`: new id, parent version + 1
    pub async fn remix(&self, prompt: &str, parent: &DesignTokenSet) -> DesignResult<Normalized> {
        let prompt = validate_prompt(Some(prompt))?;

        let mut current = serde_json::to_value(parent).unwrap_or_default();
        if let Some(object) = current.as_object_mut() {
            object.remove("metadata");
        }
        let user_prompt = format!(
            "Current design tokens:\n{}\n\nRevise them for this request and return the complete set:\n{}",
            current, prompt
        );

        let raw = self.request(&user_prompt).await?;
        self.normalizer.normalize(
            &raw,
            Provenance::Remix {
                parent: &parent.metadata,
                prompt,
            },
        )
    }

    async fn request(&self, user_prompt: &str) -> DesignResult<Value> {
        tracing::info!(
            provider = self.client.provider_name(),
            model = self.client.model_name(),
            "Requesting design tokens"
        );

        let reply = self
            .client
            .chat_json(&self.system_prompt, user_prompt)
            .await
            .map_err(|e| {
                let error = DesignError::from(e);
                if let DesignError::Upstream(source) = &error {
                    tracing::error!(
                        provider = self.client.provider_name(),
                        error = %source,
                        "Design generation failed"
                    );
                }
                error
            })?;

        tracing::debug!(reply = %truncated(&reply, MAX_LOGGED_REPLY), "Model reply");

        serde_json::from_str(strip_code_fence(&reply)).map_err(|e| {
            tracing::error!(
                error = %e,
                reply = %truncated(&reply, MAX_LOGGED_REPLY),
                "Failed to parse model reply"
            );
            DesignError::MalformedResponse(e.to_string())
        })
    }
}

fn truncated(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Remove one surrounding Markdown code fence, with or without a language tag
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    match body.split_once('\n') {
        Some((tag, rest)) if !tag.trim_start().starts_with('{') => rest.trim(),
        _ => body.trim(),
    }
}

// ============================================================================
// SYSTEM PROMPT
// ============================================================================

fn choices(field: &EnumField) -> String {
    field
        .values
        .iter()
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// JSON shape of a token set, derived from the field catalogue
fn describe_shape() -> String {
    let fields = enum_fields();

    let sections: Vec<String> = Section::ALL
        .iter()
        .map(|section| {
            let key = section.key();
            if !section.is_object() {
                let values = fields
                    .iter()
                    .find(|f| f.path == key)
                    .map(choices)
                    .unwrap_or_default();
                return format!("  \"{}\": {}", key, values);
            }

            let mut leaves: Vec<String> = match section {
                Section::ColorPalette => COLOR_KEYS
                    .iter()
                    .map(|color| format!("    \"{}\": \"<hex color>\"", color))
                    .collect(),
                Section::Typography => vec!["    \"fontFamily\": \"<CSS font-family list>\"".into()],
                _ => Vec::new(),
            };
            for field in &fields {
                if let (section_key, Some(leaf)) = field.split() {
                    if section_key == key {
                        leaves.push(format!("    \"{}\": {}", leaf, choices(field)));
                    }
                }
            }
            format!("  \"{}\": {{\n{}\n  }}", key, leaves.join(",\n"))
        })
        .collect();

    format!("JSON shape:\n{{\n{}\n}}", sections.join(",\n"))
}

/// Instructions sent with every request
pub fn build_system_prompt() -> String {
    format!(
        "{}\n{}\n\n{}",
        include_str!("prompts/design_director_system.md"),
        describe_shape(),
        include_str!("prompts/design_examples.md"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cyberpunk_reply, FixedMetadata, MockLlmClient};
    use crate::validator::ValidationMode;
    use dd_agentic::LlmError;
    use dd_types::{BorderRadius, Depth, Theme, TokenMetadata};

    const DARK_MINIMAL: &str = r##"{"theme":"dark","colorPalette":{"background":"#111111","foreground":"#f5f5f5","primary":"#e5e5e5","accent":"#737373","highlight":"#fafafa"},"typography":{"fontFamily":"Inter, sans-serif","fontMood":"modern"},"layout":{"borderRadius":"sm","spacing":"spacious","depth":"soft"},"visualStyle":{"illustrationType":"none","backgroundVisual":"solid","lightingStyle":"soft","materialStyle":"matte","blurLevel":"none"},"motionDesign":{"animationStyle":"smooth","motionIntensity":"low","scrollBehavior":"static","hoverEffects":"lift"},"vfx":{"particleEffects":"none","glowEffects":"none","noiseTexture":"none"}}"##;

    fn generator(client: Arc<MockLlmClient>, mode: ValidationMode) -> DesignGenerator {
        let normalizer = TokenNormalizer::new(mode).with_metadata_source(Arc::new(FixedMetadata));
        DesignGenerator::new(client, normalizer)
    }

    #[test]
    fn test_validate_prompt() {
        assert_eq!(validate_prompt(Some("  moody  ")).unwrap(), "moody");
        assert!(matches!(validate_prompt(None), Err(DesignError::InvalidPrompt)));
        assert!(matches!(
            validate_prompt(Some(" \n\t")),
            Err(DesignError::InvalidPrompt)
        ));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_truncated_respects_char_boundaries() {
        assert_eq!(truncated("héllo", 2), "hé...");
        assert_eq!(truncated("short", 10), "short");
    }

    #[test]
    fn test_system_prompt_lists_every_value() {
        let prompt = build_system_prompt();
        for field in enum_fields() {
            for value in field.values {
                assert!(
                    prompt.contains(&format!("\"{}\"", value)),
                    "{} missing {}",
                    field.path,
                    value
                );
            }
        }
        for key in COLOR_KEYS {
            assert!(prompt.contains(&format!("\"{}\": \"<hex color>\"", key)));
        }
        assert!(prompt.contains("\"fontFamily\": \"<CSS font-family list>\""));
    }

    #[test]
    fn test_worked_examples_are_valid() {
        let normalizer = TokenNormalizer::new(ValidationMode::Strict);
        let examples: Vec<&str> = include_str!("prompts/design_examples.md")
            .lines()
            .filter_map(|line| line.strip_prefix("You: "))
            .collect();
        assert_eq!(examples.len(), 5);
        for example in examples {
            let raw: Value = serde_json::from_str(example).unwrap();
            let normalized = normalizer
                .normalize(&raw, Provenance::Generated { prompt: "example" })
                .unwrap();
            assert!(normalized.warnings.is_empty());
        }
    }

    #[tokio::test]
    async fn test_dark_minimalist_prompt() {
        let client = Arc::new(MockLlmClient::replying(DARK_MINIMAL));
        let generator = generator(client.clone(), ValidationMode::Lenient);

        let result = generator
            .generate("dark minimalist with soft shadows")
            .await
            .unwrap();

        let tokens = result.tokens;
        assert_eq!(tokens.theme, Theme::Dark);
        assert_eq!(tokens.layout.depth, Depth::Soft);
        assert_eq!(tokens.metadata.id, FixedMetadata::ID);
        assert_eq!(tokens.metadata.version, 1);
        assert_eq!(
            tokens.metadata.source_prompt.as_deref(),
            Some("dark minimalist with soft shadows")
        );
        assert!(result.warnings.is_empty());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_prompt_makes_no_call() {
        let client = Arc::new(MockLlmClient::replying(DARK_MINIMAL));
        let generator = generator(client.clone(), ValidationMode::Lenient);

        let err = generator.generate("   ").await.unwrap_err();
        assert!(matches!(err, DesignError::InvalidPrompt));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fenced_reply_is_accepted() {
        let fenced = format!("```json\n{}\n```", cyberpunk_reply());
        let client = Arc::new(MockLlmClient::replying(&fenced));
        let result = generator(client, ValidationMode::Strict)
            .generate("neon")
            .await
            .unwrap();
        assert_eq!(result.tokens.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_prose_reply_is_malformed() {
        let client = Arc::new(MockLlmClient::replying("Here is a lovely design for you!"));
        let err = generator(client, ValidationMode::Lenient)
            .generate("anything")
            .await
            .unwrap_err();
        assert!(matches!(err, DesignError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_vfx_is_incomplete() {
        let mut raw: Value = serde_json::from_str(cyberpunk_reply()).unwrap();
        raw.as_object_mut().unwrap().remove("vfx");
        let client = Arc::new(MockLlmClient::replying(&raw.to_string()));

        let err = generator(client, ValidationMode::Lenient)
            .generate("neon")
            .await
            .unwrap_err();
        assert!(matches!(err, DesignError::IncompleteTokens { section: "vfx" }));
    }

    #[tokio::test]
    async fn test_unknown_radius_by_mode() {
        let mut raw: Value = serde_json::from_str(cyberpunk_reply()).unwrap();
        raw["layout"]["borderRadius"] = "huge".into();
        let reply = raw.to_string();

        let lenient = generator(Arc::new(MockLlmClient::replying(&reply)), ValidationMode::Lenient)
            .generate("neon")
            .await
            .unwrap();
        assert_eq!(lenient.tokens.layout.border_radius, BorderRadius::Md);
        assert_eq!(lenient.warnings.len(), 1);
        assert_eq!(lenient.warnings[0].field, "layout.borderRadius");

        let strict = generator(Arc::new(MockLlmClient::replying(&reply)), ValidationMode::Strict)
            .generate("neon")
            .await
            .unwrap_err();
        assert!(matches!(strict, DesignError::InvalidEnum { ref value, .. } if value == "huge"));
    }

    #[tokio::test]
    async fn test_missing_key_is_service_unavailable() {
        let client = Arc::new(MockLlmClient::failing(|| {
            LlmError::MissingApiKey("OPENAI_API_KEY")
        }));
        let err = generator(client, ValidationMode::Lenient)
            .generate("neon")
            .await
            .unwrap_err();
        assert!(matches!(err, DesignError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_hidden() {
        let client = Arc::new(MockLlmClient::failing(|| LlmError::EmptyResponse("OpenAI")));
        let err = generator(client, ValidationMode::Lenient)
            .generate("neon")
            .await
            .unwrap_err();
        assert!(matches!(err, DesignError::Upstream(_)));
        assert_eq!(err.user_message(), crate::error::GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_remix_increments_version() {
        let client = Arc::new(MockLlmClient::replying(cyberpunk_reply()));
        let generator = generator(client.clone(), ValidationMode::Lenient);

        let parent = DesignTokenSet::default().with_metadata(TokenMetadata {
            id: "parent-id".into(),
            version: 4,
            ..TokenMetadata::initial()
        });
        let result = generator.remix("make it neon", &parent).await.unwrap();

        assert_eq!(result.tokens.metadata.version, 5);
        assert_eq!(result.tokens.metadata.id, FixedMetadata::ID);
        assert_eq!(result.tokens.metadata.source_prompt.as_deref(), Some("make it neon"));

        let sent = client.last_user_prompt.lock().unwrap().clone().unwrap();
        assert!(sent.contains("\"theme\":\"light\""));
        assert!(sent.contains("make it neon"));
        assert!(!sent.contains("parent-id"));
    }
}
