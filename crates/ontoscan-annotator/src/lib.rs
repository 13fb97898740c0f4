//! ontoscan-annotator — Ontology term annotation.
//!
//! Maps free-text spans to ontology classes through a fingerprint-keyed
//! term cache, then optionally expands hits through class ancestry and
//! cross-ontology mappings.

pub mod aggregator;
pub mod annotation;
pub mod annotator;
pub mod catalog;
pub mod corpus;
pub mod filter;
pub mod fingerprint;
pub mod graph;
pub mod hierarchy;
pub mod instance;
pub mod mappings;
pub mod options;
pub mod recognizer;
pub mod semantic_types;
pub mod span;
pub mod stack;
pub mod store;
pub mod term_cache;

pub use annotation::{Annotation, HierarchyEntry, Occurrence};
pub use annotator::{Annotator, AnnotatorBuilder};
pub use catalog::{AnnotatorCacheStatus, OntologyCatalog, OntologyClass, Submission, SubmissionMetrics};
pub use corpus::OntologyCorpus;
pub use filter::StopWords;
pub use instance::CacheInstances;
pub use options::AnnotateOptions;
pub use recognizer::Recognizer;
pub use span::RawSpan;
pub use stack::{AnnotatorStack, CacheStack};
pub use store::{CacheStore, MemoryStore};
pub use term_cache::{TermCache, TermEntry};
