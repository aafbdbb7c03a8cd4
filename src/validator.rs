//! Token Validator / Normalizer
//!
//! Turns untrusted JSON (model replies, shared links, uploaded files) into a
//! canonical [`DesignTokenSet`].
//!
//! ## Policy
//!
//! - Missing top-level sections always fail with `IncompleteTokens`
//! - Colors must look like colors; anything else fails with `InvalidColor`
//! - A font stack containing CSS or markup delimiters fails with
//!   `InvalidFontFamily`; a blank or missing one is treated like an enum leaf
//! - Enumerated leaves depend on [`ValidationMode`]:
//!   - `Lenient` (default): unknown/missing values fall back to the default
//!     set's value and a [`NormalizationWarning`] is recorded
//!   - `Strict`: unknown/missing values fail with `InvalidEnum`

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dd_types::{
    ColorPalette, DesignTokenSet, Layout, MotionDesign, Section, Theme, TokenEnum, TokenMetadata,
    Typography, VisualStyle, Vfx, COLOR_PATTERN, DEFAULT_FONT_FAMILY, FONT_FAMILY_PATTERN,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{DesignError, DesignResult};

static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(COLOR_PATTERN).expect("COLOR_PATTERN is a valid regex"));

static FONT_FAMILY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(FONT_FAMILY_PATTERN).expect("FONT_FAMILY_PATTERN is a valid regex")
});

const MISSING: &str = "<missing>";

/// True when `value` is a hex color or a CSS color function call
pub fn is_color(value: &str) -> bool {
    COLOR_RE.is_match(value)
}

/// True when `value` can be written into a stylesheet as a font stack
pub fn is_font_family(value: &str) -> bool {
    !value.trim().is_empty() && FONT_FAMILY_RE.is_match(value)
}

// ============================================================================
// MODE
// ============================================================================

/// How enumerated leaves outside their legal set are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Replace with the default value and warn
    #[default]
    Lenient,
    /// Reject with `InvalidEnum`
    Strict,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(ValidationMode::Lenient),
            "strict" => Ok(ValidationMode::Strict),
            other => Err(format!(
                "unknown validation mode '{}'. Valid values: lenient, strict",
                other
            )),
        }
    }
}

// ============================================================================
// METADATA SOURCE
// ============================================================================

/// Clock and id generator used to stamp new token sets
pub trait MetadataSource: Send + Sync {
    fn new_id(&self) -> String;
    fn now(&self) -> DateTime<Utc>;
}

/// Random v4 UUIDs and the wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMetadataSource;

impl MetadataSource for SystemMetadataSource {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Where the payload being normalized came from
#[derive(Debug, Clone, Copy)]
pub enum Provenance<'a> {
    /// Fresh generation from a prompt: new id, version 1
    Generated { prompt: &'a str },
    /// Derived from an existing set: new id, parent version + 1
    Remix {
        parent: &'a TokenMetadata,
        prompt: &'a str,
    },
    /// Restored from a link or file: embedded metadata is kept when usable
    Restored,
}

// ============================================================================
// RESULT TYPES
// ============================================================================

/// A leaf that was replaced during lenient normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationWarning {
    pub field: String,
    /// Offending value; `None` when the field was absent
    pub found: Option<String>,
    pub replacement: String,
}

impl fmt::Display for NormalizationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.found {
            Some(found) => write!(
                f,
                "{}: '{}' replaced by '{}'",
                self.field, found, self.replacement
            ),
            None => write!(f, "{}: missing, using '{}'", self.field, self.replacement),
        }
    }
}

/// Canonical token set plus the repairs made to reach it
#[derive(Debug, Clone)]
pub struct Normalized {
    pub tokens: DesignTokenSet,
    pub warnings: Vec<NormalizationWarning>,
}

// ============================================================================
// NORMALIZER
// ============================================================================

/// Validates untrusted JSON against the token contract
#[derive(Clone)]
pub struct TokenNormalizer {
    mode: ValidationMode,
    metadata: Arc<dyn MetadataSource>,
}

impl TokenNormalizer {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            metadata: Arc::new(SystemMetadataSource),
        }
    }

    /// Replace the clock/id source (tests, deterministic replays)
    pub fn with_metadata_source(mut self, source: Arc<dyn MetadataSource>) -> Self {
        self.metadata = source;
        self
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validate `raw` and attach metadata according to `provenance`.
    pub fn normalize(&self, raw: &Value, provenance: Provenance<'_>) -> DesignResult<Normalized> {
        let root = raw.as_object().ok_or_else(|| {
            DesignError::MalformedResponse(format!("expected a JSON object, got {}", kind_of(raw)))
        })?;

        for section in Section::ALL {
            present_section(root, section)?;
        }

        let mut pass = Pass {
            mode: self.mode,
            warnings: Vec::new(),
        };

        let palette = object_section(root, Section::ColorPalette)?;
        let typography = object_section(root, Section::Typography)?;
        let layout = object_section(root, Section::Layout)?;
        let visual = object_section(root, Section::VisualStyle)?;
        let motion = object_section(root, Section::MotionDesign)?;
        let vfx = object_section(root, Section::Vfx)?;

        let defaults = ColorPalette::default();
        let tokens = DesignTokenSet {
            theme: pass.leaf::<Theme>(root.get(Section::Theme.key()))?,
            color_palette: ColorPalette {
                background: pass.color(palette, "background", &defaults.background)?,
                foreground: pass.color(palette, "foreground", &defaults.foreground)?,
                primary: pass.color(palette, "primary", &defaults.primary)?,
                accent: pass.color(palette, "accent", &defaults.accent)?,
                highlight: pass.color(palette, "highlight", &defaults.highlight)?,
            },
            typography: Typography {
                font_family: pass.font_family(typography)?,
                font_mood: pass.leaf(typography.get("fontMood"))?,
            },
            layout: Layout {
                border_radius: pass.leaf(layout.get("borderRadius"))?,
                spacing: pass.leaf(layout.get("spacing"))?,
                depth: pass.leaf(layout.get("depth"))?,
            },
            visual_style: VisualStyle {
                illustration_type: pass.leaf(visual.get("illustrationType"))?,
                background_visual: pass.leaf(visual.get("backgroundVisual"))?,
                lighting_style: pass.leaf(visual.get("lightingStyle"))?,
                material_style: pass.leaf(visual.get("materialStyle"))?,
                blur_level: pass.leaf(visual.get("blurLevel"))?,
            },
            motion_design: MotionDesign {
                animation_style: pass.leaf(motion.get("animationStyle"))?,
                motion_intensity: pass.leaf(motion.get("motionIntensity"))?,
                scroll_behavior: pass.leaf(motion.get("scrollBehavior"))?,
                hover_effects: pass.leaf(motion.get("hoverEffects"))?,
            },
            vfx: Vfx {
                particle_effects: pass.leaf(vfx.get("particleEffects"))?,
                glow_effects: pass.leaf(vfx.get("glowEffects"))?,
                noise_texture: pass.leaf(vfx.get("noiseTexture"))?,
            },
            metadata: self.metadata_for(root, provenance, &mut pass.warnings),
        };

        for warning in &pass.warnings {
            tracing::warn!(
                field = %warning.field,
                found = ?warning.found,
                replacement = %warning.replacement,
                "Token value replaced during normalization"
            );
        }

        Ok(Normalized {
            tokens,
            warnings: pass.warnings,
        })
    }

    fn fresh_metadata(&self, version: u32, prompt: Option<&str>) -> TokenMetadata {
        TokenMetadata {
            id: self.metadata.new_id(),
            version,
            created_at: self.metadata.now(),
            source_prompt: prompt.map(str::to_string),
        }
    }

    fn metadata_for(
        &self,
        root: &Map<String, Value>,
        provenance: Provenance<'_>,
        warnings: &mut Vec<NormalizationWarning>,
    ) -> TokenMetadata {
        match provenance {
            Provenance::Generated { prompt } => self.fresh_metadata(1, Some(prompt)),
            Provenance::Remix { parent, prompt } => {
                self.fresh_metadata(parent.version.saturating_add(1), Some(prompt))
            }
            Provenance::Restored => {
                let embedded = root
                    .get("metadata")
                    .or_else(|| root.get("themeMetadata"))
                    .cloned()
                    .and_then(|v| serde_json::from_value::<TokenMetadata>(v).ok())
                    .filter(|m| !m.id.trim().is_empty() && m.version >= 1);

                match embedded {
                    Some(metadata) => metadata,
                    None => {
                        let metadata = self.fresh_metadata(1, None);
                        warnings.push(NormalizationWarning {
                            field: "metadata".into(),
                            found: None,
                            replacement: metadata.id.clone(),
                        });
                        metadata
                    }
                }
            }
        }
    }
}

impl Default for TokenNormalizer {
    fn default() -> Self {
        Self::new(ValidationMode::default())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn present_section(root: &Map<String, Value>, section: Section) -> DesignResult<()> {
    match root.get(section.key()) {
        None | Some(Value::Null) => Err(DesignError::IncompleteTokens {
            section: section.key(),
        }),
        Some(Value::Object(_)) => Ok(()),
        Some(_) if !section.is_object() => Ok(()),
        Some(_) => Err(DesignError::IncompleteTokens {
            section: section.key(),
        }),
    }
}

fn object_section(root: &Map<String, Value>, section: Section) -> DesignResult<&Map<String, Value>> {
    root.get(section.key())
        .and_then(Value::as_object)
        .ok_or(DesignError::IncompleteTokens {
            section: section.key(),
        })
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Mutable state of one normalization run
struct Pass {
    mode: ValidationMode,
    warnings: Vec<NormalizationWarning>,
}

impl Pass {
    fn leaf<T: TokenEnum>(&mut self, raw: Option<&Value>) -> DesignResult<T> {
        if let Some(Value::String(s)) = raw {
            if let Ok(value) = s.parse::<T>() {
                return Ok(value);
            }
        }

        let found = raw.filter(|v| !v.is_null()).map(describe);
        match self.mode {
            ValidationMode::Strict => Err(DesignError::InvalidEnum {
                field: T::FIELD.to_string(),
                value: found.unwrap_or_else(|| MISSING.to_string()),
            }),
            ValidationMode::Lenient => {
                let fallback = T::default();
                self.warnings.push(NormalizationWarning {
                    field: T::FIELD.to_string(),
                    found,
                    replacement: fallback.as_str().to_string(),
                });
                Ok(fallback)
            }
        }
    }

    fn color(&mut self, palette: &Map<String, Value>, key: &str, fallback: &str) -> DesignResult<String> {
        let field = format!("{}.{}", Section::ColorPalette.key(), key);
        match palette.get(key) {
            Some(Value::String(s)) if is_color(s) => Ok(s.clone()),
            None | Some(Value::Null) if self.mode == ValidationMode::Lenient => {
                self.warnings.push(NormalizationWarning {
                    field,
                    found: None,
                    replacement: fallback.to_string(),
                });
                Ok(fallback.to_string())
            }
            None | Some(Value::Null) => Err(DesignError::InvalidColor {
                field,
                value: MISSING.to_string(),
            }),
            Some(other) => Err(DesignError::InvalidColor {
                field,
                value: describe(other),
            }),
        }
    }

    fn font_family(&mut self, typography: &Map<String, Value>) -> DesignResult<String> {
        let raw = typography.get("fontFamily");
        if let Some(Value::String(s)) = raw {
            if is_font_family(s) {
                return Ok(s.clone());
            }
            if !s.trim().is_empty() {
                return Err(DesignError::InvalidFontFamily { value: s.clone() });
            }
        }

        let found = raw.filter(|v| !v.is_null()).map(describe);
        match self.mode {
            ValidationMode::Strict => Err(DesignError::InvalidFontFamily {
                value: found.unwrap_or_else(|| MISSING.to_string()),
            }),
            ValidationMode::Lenient => {
                self.warnings.push(NormalizationWarning {
                    field: "typography.fontFamily".into(),
                    found,
                    replacement: DEFAULT_FONT_FAMILY.to_string(),
                });
                Ok(DEFAULT_FONT_FAMILY.to_string())
            }
        }
    }
}
