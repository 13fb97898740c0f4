//! ontoscan-recommender — Ontology recommendation.
//!
//! Annotates a text with hierarchy expansion, then scores every ontology
//! that contributed matches and ranks them.

pub mod normalise;
pub mod recommendation;
pub mod recommender;

pub use recommendation::Recommendation;
pub use recommender::{Recommender, DEFAULT_HIERARCHY_LEVELS};
