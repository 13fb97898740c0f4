//! ontoscan-common — Shared types, errors, and settings used across all ontoscan crates.

pub mod error;
pub mod entities;
pub mod settings;

// Re-export commonly used types
pub use error::{OntoscanError, Result};
pub use entities::{ontology_allowed, AnnotationKey, ClassRef, MatchType, OntologyId};
pub use settings::{MatcherKind, Settings};
