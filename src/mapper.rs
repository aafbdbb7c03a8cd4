//! Token-to-Style Mapper
//!
//! Lookup tables from enumerated token values to concrete style primitives.
//! These functions are the only place the tables exist; the applicator and
//! every other reader go through them.

use std::fmt;
use std::time::Duration;

use dd_types::{AnimationStyle, BlurLevel, BorderRadius, Depth, MotionIntensity, Spacing};

/// A CSS length
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Unitless zero (`0`)
    Zero,
    Rem(f32),
    Px(u32),
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Zero => f.write_str("0"),
            Length::Rem(v) => write!(f, "{}rem", v),
            Length::Px(v) => write!(f, "{}px", v),
        }
    }
}

/// A CSS time in whole milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Millis(pub u32);

impl Millis {
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(u64::from(self.0))
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Renderer-consumable value derived from a token
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StylePrimitive {
    Length(Length),
    Time(Millis),
    Scalar(f32),
}

impl fmt::Display for StylePrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StylePrimitive::Length(length) => length.fmt(f),
            StylePrimitive::Time(millis) => millis.fmt(f),
            StylePrimitive::Scalar(v) => write!(f, "{}", v),
        }
    }
}

// ============================================================================
// TABLES
// ============================================================================

pub fn border_radius(value: BorderRadius) -> Length {
    match value {
        BorderRadius::Sm => Length::Rem(0.25),
        BorderRadius::Md => Length::Rem(0.5),
        BorderRadius::Lg => Length::Rem(1.0),
        BorderRadius::Xl => Length::Rem(1.5),
    }
}

pub fn spacing(value: Spacing) -> Length {
    match value {
        Spacing::Compact => Length::Rem(0.75),
        Spacing::Normal => Length::Rem(1.0),
        Spacing::Spacious => Length::Rem(1.5),
    }
}

/// Shadow/elevation offset
pub fn depth(value: Depth) -> Length {
    match value {
        Depth::Flat => Length::Zero,
        Depth::Soft => Length::Px(4),
        Depth::Deep => Length::Px(12),
    }
}

pub fn animation_duration(value: AnimationStyle) -> Millis {
    match value {
        AnimationStyle::None => Millis(0),
        AnimationStyle::Dynamic => Millis(200),
        AnimationStyle::Smooth => Millis(300),
        AnimationStyle::Playful => Millis(500),
        AnimationStyle::Cinematic => Millis(800),
    }
}

/// Multiplier applied to motion distances and speeds
pub fn motion_intensity(value: MotionIntensity) -> f32 {
    match value {
        MotionIntensity::Low => 0.5,
        MotionIntensity::Medium => 1.0,
        MotionIntensity::High => 1.5,
    }
}

pub fn blur_level(value: BlurLevel) -> Length {
    match value {
        BlurLevel::None => Length::Px(0),
        BlurLevel::Subtle => Length::Px(8),
        BlurLevel::Medium => Length::Px(16),
        BlurLevel::Heavy => Length::Px(32),
    }
}

// ============================================================================
// UNTYPED LOOKUP
// ============================================================================

/// Fields with a scalar mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedField {
    BorderRadius,
    Spacing,
    Depth,
    AnimationDuration,
    MotionIntensity,
    BlurLevel,
}

pub const NEUTRAL_BORDER_RADIUS: BorderRadius = BorderRadius::Sm;
pub const NEUTRAL_SPACING: Spacing = Spacing::Normal;
pub const NEUTRAL_DEPTH: Depth = Depth::Flat;
pub const NEUTRAL_ANIMATION: AnimationStyle = AnimationStyle::None;
pub const NEUTRAL_MOTION_INTENSITY: MotionIntensity = MotionIntensity::Medium;
pub const NEUTRAL_BLUR: BlurLevel = BlurLevel::None;

fn parse_or<T>(field: MappedField, raw: &str, neutral: T) -> T
where
    T: std::str::FromStr,
{
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(?field, value = raw, "Unmapped token value, using neutral style");
        neutral
    })
}

/// Map an untyped token value, failing closed to the neutral member
/// (no radius, no elevation, no motion, no blur) when `raw` is not legal.
pub fn resolve_raw(field: MappedField, raw: &str) -> StylePrimitive {
    match field {
        MappedField::BorderRadius => {
            StylePrimitive::Length(border_radius(parse_or(field, raw, NEUTRAL_BORDER_RADIUS)))
        }
        MappedField::Spacing => StylePrimitive::Length(spacing(parse_or(field, raw, NEUTRAL_SPACING))),
        MappedField::Depth => StylePrimitive::Length(depth(parse_or(field, raw, NEUTRAL_DEPTH))),
        MappedField::AnimationDuration => {
            StylePrimitive::Time(animation_duration(parse_or(field, raw, NEUTRAL_ANIMATION)))
        }
        MappedField::MotionIntensity => StylePrimitive::Scalar(motion_intensity(parse_or(
            field,
            raw,
            NEUTRAL_MOTION_INTENSITY,
        ))),
        MappedField::BlurLevel => StylePrimitive::Length(blur_level(parse_or(field, raw, NEUTRAL_BLUR))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered<T: Copy, P: fmt::Display>(all: &[T], map: fn(T) -> P) -> Vec<String> {
        all.iter().map(|v| map(*v).to_string()).collect()
    }

    fn assert_distinct(values: &[String]) {
        let mut sorted = values.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), values.len(), "duplicate mapping in {values:?}");
    }

    #[test]
    fn test_border_radius_table() {
        let out = rendered(BorderRadius::ALL, border_radius);
        assert_eq!(out, ["0.25rem", "0.5rem", "1rem", "1.5rem"]);
        assert_distinct(&out);
    }

    #[test]
    fn test_spacing_table() {
        let out = rendered(Spacing::ALL, spacing);
        assert_eq!(out, ["0.75rem", "1rem", "1.5rem"]);
        assert_distinct(&out);
    }

    #[test]
    fn test_depth_table() {
        let out = rendered(Depth::ALL, depth);
        assert_eq!(out, ["0", "4px", "12px"]);
        assert_distinct(&out);
    }

    #[test]
    fn test_animation_table() {
        // ALL order: none, smooth, cinematic, dynamic, playful
        let out = rendered(AnimationStyle::ALL, animation_duration);
        assert_eq!(out, ["0ms", "300ms", "800ms", "200ms", "500ms"]);
        assert_distinct(&out);
        assert_eq!(
            animation_duration(AnimationStyle::Cinematic).as_duration(),
            Duration::from_millis(800)
        );
    }

    #[test]
    fn test_motion_intensity_table() {
        let out = rendered(MotionIntensity::ALL, motion_intensity);
        assert_eq!(out, ["0.5", "1", "1.5"]);
        assert_distinct(&out);
    }

    #[test]
    fn test_blur_table() {
        let out = rendered(BlurLevel::ALL, blur_level);
        assert_eq!(out, ["0px", "8px", "16px", "32px"]);
        assert_distinct(&out);
    }

    #[test]
    fn test_resolve_raw_legal_values() {
        assert_eq!(
            resolve_raw(MappedField::BorderRadius, "xl").to_string(),
            "1.5rem"
        );
        assert_eq!(
            resolve_raw(MappedField::AnimationDuration, "playful").to_string(),
            "500ms"
        );
        assert_eq!(
            resolve_raw(MappedField::MotionIntensity, "high"),
            StylePrimitive::Scalar(1.5)
        );
    }

    #[test]
    fn test_resolve_raw_fails_closed() {
        assert_eq!(resolve_raw(MappedField::BorderRadius, "huge").to_string(), "0.25rem");
        assert_eq!(resolve_raw(MappedField::Spacing, "").to_string(), "1rem");
        assert_eq!(resolve_raw(MappedField::Depth, "abyss").to_string(), "0");
        assert_eq!(
            resolve_raw(MappedField::AnimationDuration, "wobbly").to_string(),
            "0ms"
        );
        assert_eq!(
            resolve_raw(MappedField::MotionIntensity, "ludicrous").to_string(),
            "1"
        );
        assert_eq!(resolve_raw(MappedField::BlurLevel, "MEDIUM").to_string(), "0px");
    }
}
