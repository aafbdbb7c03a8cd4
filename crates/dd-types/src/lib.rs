//! Design Token Types
//!
//! This crate is the SINGLE SOURCE OF TRUTH for the design token contract:
//! every enumerated token field, its legal values, the fallback token set and
//! the JSON Schema handed to clients and to the language model.
//!
//! ## Shape
//!
//! ```text
//! DesignTokenSet
//! ├── theme
//! ├── colorPalette   { background, foreground, primary, accent, highlight }
//! ├── typography     { fontFamily, fontMood }
//! ├── layout         { borderRadius, spacing, depth }
//! ├── visualStyle    { illustrationType, backgroundVisual, lightingStyle, materialStyle, blurLevel }
//! ├── motionDesign   { animationStyle, motionIntensity, scrollBehavior, hoverEffects }
//! ├── vfx            { particleEffects, glowEffects, noiseTexture }
//! └── metadata       { id, version, createdAt, sourcePrompt? }
//! ```
//!
//! ## Rules
//!
//! 1. JSON keys are camelCase, enum values are the literal strings below
//! 2. A `DesignTokenSet` is always fully populated
//! 3. Untrusted JSON never deserializes straight into these types; it goes
//!    through the validator in the main crate first

pub mod schema;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use schema::{
    enum_fields, token_set_schema, EnumField, Section, COLOR_KEYS, COLOR_PATTERN,
    FONT_FAMILY_PATTERN,
};

// ============================================================================
// ENUMERATED TOKENS
// ============================================================================

/// Error returned when a string is not one of an enum's legal values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTokenValue {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownTokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a legal value for {}", self.value, self.field)
    }
}

impl std::error::Error for UnknownTokenValue {}

/// Common surface of every enumerated token field.
pub trait TokenEnum: Copy + Default + FromStr<Err = UnknownTokenValue> + 'static {
    /// Dotted JSON path of the field, e.g. `layout.borderRadius`
    const FIELD: &'static str;
    /// Legal values in declaration order
    const NAMES: &'static [&'static str];

    fn as_str(self) -> &'static str;
}

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident at $field:literal, default $default:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl TokenEnum for $name {
            const FIELD: &'static str = $field;
            const NAMES: &'static [&'static str] = &[$($text),+];

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownTokenValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownTokenValue {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

token_enum! {
    /// Page-level theme; drives the exclusive theme class on the document root
    pub enum Theme at "theme", default Light {
        Light => "light",
        Dark => "dark",
        Auto => "auto",
        Custom => "custom",
    }
}

token_enum! {
    pub enum FontMood at "typography.fontMood", default Modern {
        Modern => "modern",
        Elegant => "elegant",
        Futuristic => "futuristic",
        Playful => "playful",
        Cinematic => "cinematic",
    }
}

token_enum! {
    pub enum BorderRadius at "layout.borderRadius", default Md {
        Sm => "sm",
        Md => "md",
        Lg => "lg",
        Xl => "xl",
    }
}

token_enum! {
    pub enum Spacing at "layout.spacing", default Normal {
        Compact => "compact",
        Normal => "normal",
        Spacious => "spacious",
    }
}

token_enum! {
    /// Shadow/elevation strength
    pub enum Depth at "layout.depth", default Soft {
        Flat => "flat",
        Soft => "soft",
        Deep => "deep",
    }
}

token_enum! {
    pub enum IllustrationType at "visualStyle.illustrationType", default None {
        None => "none",
        Abstract3d => "abstract-3d",
        Gradient3d => "gradient-3d",
        Cinematic3d => "cinematic-3d",
        Glassmorphism => "glassmorphism",
        Holographic => "holographic",
    }
}

token_enum! {
    pub enum BackgroundVisual at "visualStyle.backgroundVisual", default Solid {
        Solid => "solid",
        Gradient => "gradient",
        AbstractShapes => "abstract-shapes",
        Scene3d => "3d-scene",
        ParticleField => "particle-field",
    }
}

token_enum! {
    pub enum LightingStyle at "visualStyle.lightingStyle", default Soft {
        Soft => "soft",
        Dramatic => "dramatic",
        Neon => "neon",
        Studio => "studio",
        Cinematic => "cinematic",
    }
}

token_enum! {
    pub enum MaterialStyle at "visualStyle.materialStyle", default Matte {
        Matte => "matte",
        Glossy => "glossy",
        Glass => "glass",
        Metallic => "metallic",
        Plastic => "plastic",
    }
}

token_enum! {
    /// Backdrop blur strength
    pub enum BlurLevel at "visualStyle.blurLevel", default None {
        None => "none",
        Subtle => "subtle",
        Medium => "medium",
        Heavy => "heavy",
    }
}

token_enum! {
    pub enum AnimationStyle at "motionDesign.animationStyle", default Smooth {
        None => "none",
        Smooth => "smooth",
        Cinematic => "cinematic",
        Dynamic => "dynamic",
        Playful => "playful",
    }
}

token_enum! {
    pub enum MotionIntensity at "motionDesign.motionIntensity", default Medium {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

token_enum! {
    pub enum ScrollBehavior at "motionDesign.scrollBehavior", default Static {
        Static => "static",
        Parallax => "parallax",
        Layered => "layered",
        Immersive => "immersive",
    }
}

token_enum! {
    pub enum HoverEffects at "motionDesign.hoverEffects", default None {
        None => "none",
        Glow => "glow",
        Lift => "lift",
        Morph => "morph",
    }
}

token_enum! {
    pub enum ParticleEffects at "vfx.particleEffects", default None {
        None => "none",
        Subtle => "subtle",
        Ambient => "ambient",
        Rich => "rich",
    }
}

token_enum! {
    pub enum GlowEffects at "vfx.glowEffects", default None {
        None => "none",
        Soft => "soft",
        Strong => "strong",
    }
}

token_enum! {
    /// Film-grain style overlay
    pub enum NoiseTexture at "vfx.noiseTexture", default None {
        None => "none",
        Film => "film",
        Grain => "grain",
    }
}

// ============================================================================
// SECTIONS
// ============================================================================

pub const DEFAULT_BACKGROUND: &str = "#ffffff";
pub const DEFAULT_FOREGROUND: &str = "#1f2937";
pub const DEFAULT_PRIMARY: &str = "#3b82f6";
pub const DEFAULT_ACCENT: &str = "#8b5cf6";
pub const DEFAULT_HIGHLIGHT: &str = "#f59e0b";
pub const DEFAULT_FONT_FAMILY: &str = "Inter, system-ui, sans-serif";

/// Color palette; each entry is a hex color or a CSS color function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub background: String,
    pub foreground: String,
    pub primary: String,
    pub accent: String,
    pub highlight: String,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND.to_string(),
            foreground: DEFAULT_FOREGROUND.to_string(),
            primary: DEFAULT_PRIMARY.to_string(),
            accent: DEFAULT_ACCENT.to_string(),
            highlight: DEFAULT_HIGHLIGHT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    /// Free-form CSS `font-family` value
    pub font_family: String,
    pub font_mood: FontMood,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_mood: FontMood::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub border_radius: BorderRadius,
    pub spacing: Spacing,
    pub depth: Depth,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualStyle {
    pub illustration_type: IllustrationType,
    pub background_visual: BackgroundVisual,
    pub lighting_style: LightingStyle,
    pub material_style: MaterialStyle,
    pub blur_level: BlurLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionDesign {
    pub animation_style: AnimationStyle,
    pub motion_intensity: MotionIntensity,
    pub scroll_behavior: ScrollBehavior,
    pub hover_effects: HoverEffects,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vfx {
    pub particle_effects: ParticleEffects,
    pub glow_effects: GlowEffects,
    pub noise_texture: NoiseTexture,
}

// ============================================================================
// METADATA
// ============================================================================

/// Provenance of a token set.
///
/// Older exports used `themeMetadata { themeID, version, timestamp, promptUsed }`;
/// the aliases below let those files deserialize unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    #[serde(alias = "themeID")]
    pub id: String,
    /// Starts at 1, incremented on every remix
    pub version: u32,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "promptUsed"
    )]
    pub source_prompt: Option<String>,
}

impl TokenMetadata {
    /// Metadata carried by the built-in default set
    pub fn initial() -> Self {
        Self {
            id: Uuid::nil().to_string(),
            version: 1,
            created_at: DateTime::UNIX_EPOCH,
            source_prompt: None,
        }
    }
}

// ============================================================================
// TOKEN SET
// ============================================================================

/// Canonical, fully-populated design token record.
///
/// Instances are treated as immutable snapshots: state changes replace the
/// whole record rather than editing fields in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignTokenSet {
    pub theme: Theme,
    pub color_palette: ColorPalette,
    pub typography: Typography,
    pub layout: Layout,
    pub visual_style: VisualStyle,
    pub motion_design: MotionDesign,
    pub vfx: Vfx,
    #[serde(alias = "themeMetadata")]
    pub metadata: TokenMetadata,
}

impl DesignTokenSet {
    /// Same tokens, different provenance
    pub fn with_metadata(mut self, metadata: TokenMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// File name used when the set is downloaded
    pub fn export_file_name(&self) -> String {
        format!("theme-{}.json", self.metadata.id)
    }
}

impl Default for DesignTokenSet {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            color_palette: ColorPalette::default(),
            typography: Typography::default(),
            layout: Layout::default(),
            visual_style: VisualStyle::default(),
            motion_design: MotionDesign::default(),
            vfx: Vfx::default(),
            metadata: TokenMetadata::initial(),
        }
    }
}

// ============================================================================
// API
// ============================================================================

/// Body of `POST /api/design` and `POST /api/design/remix`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Successful reply carrying a token set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokensResponse {
    pub tokens: DesignTokenSet,
}

/// Reply of `GET /api/theme/share`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    pub url: String,
    pub encoded: String,
}

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
