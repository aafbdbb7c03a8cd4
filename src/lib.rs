//! Design Director
//!
//! Natural-language design prompts in, validated design tokens out, applied
//! as CSS custom properties, data attributes and theme classes.
//!
//! ```text
//! prompt ──► generation ──► validator ──► store ──► applicator ──► DocumentRoot
//!                                          ▲  │
//!                      sharing (link/file) ┘  └► sharing (link/file)
//! ```
//!
//! The token types themselves live in `dd-types`; provider clients live in
//! `dd-agentic`.

pub mod applicator;
pub mod config;
pub mod error;
pub mod generation;
pub mod mapper;
pub mod sharing;
pub mod store;
pub mod validator;

#[cfg(feature = "server")]
pub mod api;

#[cfg(test)]
mod fixtures;

pub use applicator::{apply, spawn_applicator, DocumentRoot, StylePatch, StyleSurface};
pub use config::{ConfigError, DesignConfig};
pub use error::{DesignError, DesignResult};
pub use generation::DesignGenerator;
pub use store::{DesignState, DesignStore, UpdateTicket};
pub use validator::{Normalized, Provenance, TokenNormalizer, ValidationMode};

pub use dd_types::DesignTokenSet;
