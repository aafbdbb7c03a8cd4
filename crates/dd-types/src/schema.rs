//! Field catalogue and JSON Schema
//!
//! The catalogue is derived from the [`TokenEnum`] impls, so the validator,
//! the model instructions and the published schema cannot drift apart.

use serde_json::{json, Map, Value};

use crate::{
    AnimationStyle, BackgroundVisual, BlurLevel, BorderRadius, Depth, FontMood, GlowEffects,
    HoverEffects, IllustrationType, LightingStyle, MaterialStyle, MotionIntensity, NoiseTexture,
    ParticleEffects, ScrollBehavior, Spacing, Theme, TokenEnum,
};

/// Keys of the `colorPalette` section, in declaration order
pub const COLOR_KEYS: [&str; 5] = ["background", "foreground", "primary", "accent", "highlight"];

/// `#` followed by 3/4/6/8 hex digits, or a CSS color function call whose
/// arguments are numbers, units, keywords and separators only
pub const COLOR_PATTERN: &str = r"^(#([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})|(rgba?|hsla?|hwb|lab|lch|oklab|oklch|color)\([0-9a-zA-Z.%+\-\s,/]*\))$";

/// A font stack: any text without declaration, block, markup or comment
/// delimiters, on a single line
pub const FONT_FAMILY_PATTERN: &str = r"^[^;{}<>\\/\r\n]+$";

/// Top-level sections of a token set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Theme,
    ColorPalette,
    Typography,
    Layout,
    VisualStyle,
    MotionDesign,
    Vfx,
}

impl Section {
    /// Required sections, in the order they are checked
    pub const ALL: [Section; 7] = [
        Section::Theme,
        Section::ColorPalette,
        Section::Typography,
        Section::Layout,
        Section::VisualStyle,
        Section::MotionDesign,
        Section::Vfx,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Section::Theme => "theme",
            Section::ColorPalette => "colorPalette",
            Section::Typography => "typography",
            Section::Layout => "layout",
            Section::VisualStyle => "visualStyle",
            Section::MotionDesign => "motionDesign",
            Section::Vfx => "vfx",
        }
    }

    /// `theme` is a bare string; every other section is an object
    pub fn is_object(self) -> bool {
        !matches!(self, Section::Theme)
    }
}

/// One enumerated leaf field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumField {
    /// Dotted path, e.g. `vfx.glowEffects`
    pub path: &'static str,
    pub values: &'static [&'static str],
    pub default: &'static str,
}

impl EnumField {
    fn of<T: TokenEnum>() -> Self {
        Self {
            path: T::FIELD,
            values: T::NAMES,
            default: T::default().as_str(),
        }
    }

    /// Section key and leaf key; `theme` has no leaf key
    pub fn split(&self) -> (&'static str, Option<&'static str>) {
        match self.path.split_once('.') {
            Some((section, leaf)) => (section, Some(leaf)),
            None => (self.path, None),
        }
    }
}

/// Every enumerated field in schema order
pub fn enum_fields() -> Vec<EnumField> {
    vec![
        EnumField::of::<Theme>(),
        EnumField::of::<FontMood>(),
        EnumField::of::<BorderRadius>(),
        EnumField::of::<Spacing>(),
        EnumField::of::<Depth>(),
        EnumField::of::<IllustrationType>(),
        EnumField::of::<BackgroundVisual>(),
        EnumField::of::<LightingStyle>(),
        EnumField::of::<MaterialStyle>(),
        EnumField::of::<BlurLevel>(),
        EnumField::of::<AnimationStyle>(),
        EnumField::of::<MotionIntensity>(),
        EnumField::of::<ScrollBehavior>(),
        EnumField::of::<HoverEffects>(),
        EnumField::of::<ParticleEffects>(),
        EnumField::of::<GlowEffects>(),
        EnumField::of::<NoiseTexture>(),
    ]
}

fn section_object(properties: Map<String, Value>) -> Value {
    let required: Vec<Value> = properties.keys().cloned().map(Value::String).collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// JSON Schema (draft 2020-12) describing a complete `DesignTokenSet`.
pub fn token_set_schema() -> Value {
    let mut sections: Map<String, Value> = Map::new();

    let colors: Map<String, Value> = COLOR_KEYS
        .iter()
        .map(|key| {
            (
                key.to_string(),
                json!({ "type": "string", "pattern": COLOR_PATTERN }),
            )
        })
        .collect();
    sections.insert("colorPalette".into(), section_object(colors));

    let mut typography = Map::new();
    typography.insert(
        "fontFamily".into(),
        json!({ "type": "string", "minLength": 1, "pattern": FONT_FAMILY_PATTERN }),
    );

    let mut grouped: Vec<(&'static str, Map<String, Value>)> = Vec::new();
    for field in enum_fields() {
        let schema = json!({ "type": "string", "enum": field.values });
        match field.split() {
            (section, None) => {
                sections.insert(section.to_string(), schema);
            }
            ("typography", Some(leaf)) => {
                typography.insert(leaf.to_string(), schema);
            }
            (section, Some(leaf)) => match grouped.iter_mut().find(|(s, _)| *s == section) {
                Some((_, props)) => {
                    props.insert(leaf.to_string(), schema);
                }
                None => {
                    let mut props = Map::new();
                    props.insert(leaf.to_string(), schema);
                    grouped.push((section, props));
                }
            },
        }
    }
    sections.insert("typography".into(), section_object(typography));
    for (section, props) in grouped {
        sections.insert(section.to_string(), section_object(props));
    }

    sections.insert(
        "metadata".into(),
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string", "minLength": 1 },
                "version": { "type": "integer", "minimum": 1 },
                "createdAt": { "type": "string", "format": "date-time" },
                "sourcePrompt": { "type": "string" }
            },
            "required": ["id", "version", "createdAt"]
        }),
    );

    let required: Vec<&str> = Section::ALL.iter().map(|s| s.key()).collect();
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "DesignTokenSet",
        "type": "object",
        "properties": sections,
        "required": required,
    })
}
