//! Serialization and sharing
//!
//! A token set travels in two forms:
//! - compact text: JSON encoded as URL-safe base64 without padding, carried in
//!   the `theme` query parameter of a shareable link
//! - export file: pretty-printed JSON named `theme-{id}.json`
//!
//! Both come back through the validator with `Restored` provenance, so the
//! embedded id survives and bad input never reaches the store.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine,
};
use dd_types::DesignTokenSet;
use serde_json::Value;
use url::Url;

use crate::error::{DesignError, DesignResult};
use crate::validator::{Provenance, TokenNormalizer};

/// Query parameter carrying the compact text
pub const THEME_PARAM: &str = "theme";

pub fn to_compact_text(tokens: &DesignTokenSet) -> serde_json::Result<String> {
    let json = serde_json::to_vec(tokens)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a shared link payload; `None` on any failure.
pub fn from_compact_text(normalizer: &TokenNormalizer, text: &str) -> Option<DesignTokenSet> {
    match decode_compact(normalizer, text) {
        Ok(tokens) => Some(tokens),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring undecodable shared theme");
            None
        }
    }
}

fn decode_compact(normalizer: &TokenNormalizer, text: &str) -> DesignResult<DesignTokenSet> {
    let text = text.trim();
    // Links produced by older clients used padded standard base64
    let bytes = URL_SAFE_NO_PAD
        .decode(text.trim_end_matches('='))
        .or_else(|_| STANDARD.decode(text))
        .map_err(|e| DesignError::DecodeFailure(format!("not base64: {}", e)))?;
    restore(normalizer, &bytes)
}

/// Pretty JSON for download
pub fn export_json(tokens: &DesignTokenSet) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tokens)
}

/// Validate an uploaded theme file
pub fn import_file(normalizer: &TokenNormalizer, contents: &[u8]) -> DesignResult<DesignTokenSet> {
    restore(normalizer, contents).inspect_err(|e| {
        tracing::warn!(error = %e, "Rejected theme file");
    })
}

fn restore(normalizer: &TokenNormalizer, bytes: &[u8]) -> DesignResult<DesignTokenSet> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| DesignError::DecodeFailure(format!("not JSON: {}", e)))?;
    normalizer
        .normalize(&value, Provenance::Restored)
        .map(|normalized| normalized.tokens)
        .map_err(|e| DesignError::DecodeFailure(e.to_string()))
}

/// `base` with `theme=<compact text>`; other query parameters are kept.
pub fn shareable_url(base: &Url, tokens: &DesignTokenSet) -> serde_json::Result<Url> {
    let encoded = to_compact_text(tokens)?;
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != THEME_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(THEME_PARAM, &encoded);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cyberpunk_reply, FixedMetadata};
    use crate::validator::ValidationMode;
    use std::sync::Arc;

    fn normalizer() -> TokenNormalizer {
        TokenNormalizer::new(ValidationMode::Strict).with_metadata_source(Arc::new(FixedMetadata))
    }

    fn generated() -> DesignTokenSet {
        let raw: Value = serde_json::from_str(cyberpunk_reply()).unwrap();
        normalizer()
            .normalize(&raw, Provenance::Generated { prompt: "neon night city" })
            .unwrap()
            .tokens
    }

    #[test]
    fn test_compact_round_trip() {
        let tokens = generated();
        let text = to_compact_text(&tokens).unwrap();
        assert!(!text.contains('='));
        assert!(!text.contains('+'));
        assert!(!text.contains('/'));
        assert_eq!(from_compact_text(&normalizer(), &text), Some(tokens));
    }

    #[test]
    fn test_default_set_round_trip() {
        let tokens = DesignTokenSet::default();
        let text = to_compact_text(&tokens).unwrap();
        assert_eq!(from_compact_text(&normalizer(), &text), Some(tokens));
    }

    #[test]
    fn test_padded_standard_base64_is_accepted() {
        let tokens = generated();
        let text = STANDARD.encode(serde_json::to_vec(&tokens).unwrap());
        assert_eq!(from_compact_text(&normalizer(), &text), Some(tokens));
    }

    #[test]
    fn test_garbage_decodes_to_none() {
        assert_eq!(from_compact_text(&normalizer(), "%%%not-base64%%%"), None);
        // Valid base64, not JSON
        assert_eq!(from_compact_text(&normalizer(), "aGVsbG8"), None);
        // Valid JSON, missing sections
        let partial = URL_SAFE_NO_PAD.encode(br#"{"theme":"dark"}"#);
        assert_eq!(from_compact_text(&normalizer(), &partial), None);
    }

    #[test]
    fn test_restored_id_is_preserved() {
        let tokens = generated();
        let text = to_compact_text(&tokens).unwrap();
        let restored = from_compact_text(&TokenNormalizer::default(), &text).unwrap();
        assert_eq!(restored.metadata.id, FixedMetadata::ID);
        assert_eq!(restored.metadata.source_prompt.as_deref(), Some("neon night city"));
    }

    #[test]
    fn test_export_then_import() {
        let tokens = generated();
        let file = export_json(&tokens).unwrap();
        assert!(file.contains("\n  \"theme\": \"dark\""));
        assert_eq!(tokens.export_file_name(), format!("theme-{}.json", FixedMetadata::ID));
        assert_eq!(import_file(&normalizer(), file.as_bytes()).unwrap(), tokens);
    }

    #[test]
    fn test_import_legacy_export() {
        let mut raw: Value = serde_json::from_str(cyberpunk_reply()).unwrap();
        raw["themeMetadata"] = serde_json::json!({
            "themeID": "legacy-theme",
            "version": 3,
            "timestamp": "2024-11-02T08:30:00Z",
            "promptUsed": "retro arcade"
        });
        let tokens = import_file(&normalizer(), raw.to_string().as_bytes()).unwrap();
        assert_eq!(tokens.metadata.id, "legacy-theme");
        assert_eq!(tokens.metadata.version, 3);
        assert_eq!(tokens.metadata.source_prompt.as_deref(), Some("retro arcade"));
    }

    #[test]
    fn test_import_failures_are_decode_failures() {
        let err = import_file(&normalizer(), b"{ nope").unwrap_err();
        assert!(matches!(err, DesignError::DecodeFailure(_)));

        let mut raw: Value = serde_json::from_str(cyberpunk_reply()).unwrap();
        raw["colorPalette"]["primary"] = "not-a-color".into();
        let err = import_file(&normalizer(), raw.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, DesignError::DecodeFailure(ref m) if m.contains("not-a-color")));
    }

    #[test]
    fn test_hostile_values_are_refused_from_files_and_links() {
        let mut raw: Value = serde_json::from_str(cyberpunk_reply()).unwrap();
        raw["colorPalette"]["background"] = "rgb(0;} body{background:red} :root{--a:0)".into();
        let err = import_file(&normalizer(), raw.to_string().as_bytes()).unwrap_err();
        assert!(
            matches!(err, DesignError::DecodeFailure(ref m) if m.contains("colorPalette.background"))
        );

        let mut raw: Value = serde_json::from_str(cyberpunk_reply()).unwrap();
        raw["typography"]["fontFamily"] = "Inter; } html { display: none } :root { --x: 1".into();
        let err = import_file(&normalizer(), raw.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, DesignError::DecodeFailure(ref m) if m.contains("font family")));

        let link = URL_SAFE_NO_PAD.encode(raw.to_string());
        assert_eq!(from_compact_text(&normalizer(), &link), None);
    }

    #[test]
    fn test_shareable_url() {
        let tokens = generated();
        let base = Url::parse("https://designs.example.com/studio?lang=en&theme=old").unwrap();
        let url = shareable_url(&base, &tokens).unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("lang".to_string(), "en".to_string()));
        assert_eq!(pairs[1].0, THEME_PARAM);
        assert_eq!(pairs.len(), 2);
        assert_eq!(from_compact_text(&normalizer(), &pairs[1].1), Some(tokens));
    }
}
