//! Style Applicator
//!
//! Projects a [`DesignTokenSet`] onto a style surface: CSS custom properties,
//! `data-*` attributes and mutually exclusive class groups. The whole surface
//! is described by one [`StylePatch`] and committed in a single call, so a
//! reader never sees half of one set and half of another.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::sync::Arc;

use dd_types::{
    AnimationStyle, DesignTokenSet, IllustrationType, ScrollBehavior, Theme, TokenEnum,
};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::mapper;
use crate::store::DesignStore;

// ============================================================================
// PATCH
// ============================================================================

/// Classes of which at most one may be present on the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassGroup {
    pub members: Vec<String>,
    pub active: String,
}

impl ClassGroup {
    fn of<T: TokenEnum>(prefix: &str, active: T) -> Self {
        Self {
            members: T::NAMES
                .iter()
                .map(|name| format!("{}{}", prefix, name))
                .collect(),
            active: format!("{}{}", prefix, active.as_str()),
        }
    }
}

/// Complete description of the styled surface for one token set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StylePatch {
    pub properties: Vec<(&'static str, String)>,
    pub attributes: Vec<(&'static str, &'static str)>,
    pub class_groups: Vec<ClassGroup>,
}

/// Something that can receive a [`StylePatch`].
///
/// `commit` must apply the patch as one unit.
pub trait StyleSurface {
    fn commit(&mut self, patch: &StylePatch);
}

/// Build the patch for `tokens`. Values are assumed already validated.
pub fn build_patch(tokens: &DesignTokenSet) -> StylePatch {
    let palette = &tokens.color_palette;
    let layout = tokens.layout;
    let visual = tokens.visual_style;
    let motion = tokens.motion_design;
    let vfx = tokens.vfx;

    let properties = vec![
        ("--bg-color", palette.background.clone()),
        ("--text-color", palette.foreground.clone()),
        ("--primary-color", palette.primary.clone()),
        ("--accent-color", palette.accent.clone()),
        ("--highlight-color", palette.highlight.clone()),
        ("--font-family", tokens.typography.font_family.clone()),
        (
            "--border-radius",
            mapper::border_radius(layout.border_radius).to_string(),
        ),
        ("--spacing", mapper::spacing(layout.spacing).to_string()),
        ("--depth", mapper::depth(layout.depth).to_string()),
        (
            "--animation-duration",
            mapper::animation_duration(motion.animation_style).to_string(),
        ),
        (
            "--motion-intensity",
            mapper::motion_intensity(motion.motion_intensity).to_string(),
        ),
        (
            "--blur-level",
            mapper::blur_level(visual.blur_level).to_string(),
        ),
    ];

    let attributes = vec![
        ("data-font-mood", tokens.typography.font_mood.as_str()),
        ("data-animation-style", motion.animation_style.as_str()),
        ("data-scroll-behavior", motion.scroll_behavior.as_str()),
        ("data-hover-effects", motion.hover_effects.as_str()),
        ("data-illustration-type", visual.illustration_type.as_str()),
        ("data-background-visual", visual.background_visual.as_str()),
        ("data-lighting-style", visual.lighting_style.as_str()),
        ("data-material-style", visual.material_style.as_str()),
        ("data-particle-effects", vfx.particle_effects.as_str()),
        ("data-glow-effects", vfx.glow_effects.as_str()),
        ("data-noise-texture", vfx.noise_texture.as_str()),
    ];

    let class_groups = vec![
        ClassGroup::of::<Theme>("", tokens.theme),
        ClassGroup::of::<IllustrationType>("illustration-", visual.illustration_type),
        ClassGroup::of::<AnimationStyle>("animation-", motion.animation_style),
        ClassGroup::of::<ScrollBehavior>("scroll-", motion.scroll_behavior),
    ];

    StylePatch {
        properties,
        attributes,
        class_groups,
    }
}

/// Apply `tokens` to `surface`
pub fn apply<S: StyleSurface + ?Sized>(surface: &mut S, tokens: &DesignTokenSet) {
    let patch = build_patch(tokens);
    surface.commit(&patch);
    tracing::debug!(
        theme_id = %tokens.metadata.id,
        version = tokens.metadata.version,
        "Applied design tokens"
    );
}

// ============================================================================
// DOCUMENT ROOT
// ============================================================================

/// In-memory document root element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentRoot {
    properties: BTreeMap<String, String>,
    attributes: BTreeMap<String, String>,
    classes: BTreeSet<String>,
}

impl DocumentRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Add a class outside any token-controlled group
    pub fn add_class(&mut self, class: impl Into<String>) {
        self.classes.insert(class.into());
    }

    /// Stylesheet declaring every custom property on `:root`
    pub fn to_css(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in &self.properties {
            let _ = writeln!(css, "  {}: {};", name, value);
        }
        css.push_str("}\n");
        css
    }

    /// Opening `<html>` tag carrying classes, attributes and inline properties
    pub fn html_open_tag(&self) -> String {
        let mut tag = String::from("<html");
        if !self.classes.is_empty() {
            let classes: Vec<&str> = self.classes().collect();
            let _ = write!(tag, " class=\"{}\"", escape_attr(&classes.join(" ")));
        }
        for (name, value) in &self.attributes {
            let _ = write!(tag, " {}=\"{}\"", name, escape_attr(value));
        }
        if !self.properties.is_empty() {
            let style: Vec<String> = self
                .properties
                .iter()
                .map(|(name, value)| format!("{}: {}", name, value))
                .collect();
            let _ = write!(tag, " style=\"{}\"", escape_attr(&style.join("; ")));
        }
        tag.push('>');
        tag
    }
}

impl StyleSurface for DocumentRoot {
    fn commit(&mut self, patch: &StylePatch) {
        for (name, value) in &patch.properties {
            self.properties.insert((*name).to_string(), value.clone());
        }
        for (name, value) in &patch.attributes {
            self.attributes.insert((*name).to_string(), (*value).to_string());
        }
        for group in &patch.class_groups {
            for member in &group.members {
                self.classes.remove(member);
            }
            self.classes.insert(group.active.clone());
        }
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ============================================================================
// REACTIVE LOOP
// ============================================================================

/// Apply the store's current set, then re-apply on every replacement.
///
/// Each applied document is published as a fresh snapshot on the returned
/// receiver. The task ends when the store or every receiver is dropped.
pub fn spawn_applicator(
    store: &DesignStore,
) -> (watch::Receiver<Arc<DocumentRoot>>, JoinHandle<()>) {
    let mut states = store.subscribe();
    let mut document = DocumentRoot::new();
    let mut applied = states.borrow_and_update().tokens.clone();
    apply(&mut document, &applied);

    let (tx, rx) = watch::channel(Arc::new(document.clone()));

    let handle = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let tokens = states.borrow_and_update().tokens.clone();
            // Flag-only transitions carry the same set
            if Arc::ptr_eq(&tokens, &applied) {
                continue;
            }
            apply(&mut document, &tokens);
            applied = tokens;
            if tx.send(Arc::new(document.clone())).is_err() {
                break;
            }
        }
        tracing::debug!("Style applicator stopped");
    });

    (rx, handle)
}
