//! Trait for ontology catalog access.
//!
//! Provides an abstraction over the ontology repository: which ontologies
//! exist, their latest submission, paged class data and submission
//! metrics. The term cache builder and the recommender only talk to this
//! trait.

use std::fmt;

use async_trait::async_trait;
use ontoscan_common::{OntologyId, Result};
use serde::{Deserialize, Serialize};

/// A submission (version) of an ontology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub ontology: OntologyId,
    pub submission_id: u32,
}

impl Submission {
    /// Named graph holding this submission's triples.
    pub fn graph_uri(&self) -> String {
        format!("{}/submissions/{}", self.ontology, self.submission_id)
    }
}

impl fmt::Display for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.ontology.acronym(), self.submission_id)
    }
}

/// Class data needed to populate the term cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OntologyClass {
    pub id: String,
    #[serde(default)]
    pub pref_label: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub definition: Vec<String>,
    #[serde(default)]
    pub semantic_types: Vec<String>,
}

/// One page of classes. Pages are numbered from 1.
#[derive(Debug, Clone, Default)]
pub struct ClassPage {
    pub classes: Vec<OntologyClass>,
    pub next_page: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionMetrics {
    pub classes: Option<i64>,
}

/// Outcome recorded on a submission after a term cache build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotatorCacheStatus {
    Populated,
    Error(String),
}

#[async_trait]
pub trait OntologyCatalog: Send + Sync {
    async fn ontologies(&self) -> Result<Vec<OntologyId>>;

    /// `None` when the ontology has no submission.
    async fn latest_submission(&self, ontology: &OntologyId) -> Result<Option<Submission>>;

    async fn class_page(&self, submission: &Submission, page: usize, size: usize) -> Result<ClassPage>;

    /// Precomputed metrics, `None` when they were never calculated.
    async fn metrics(&self, submission: &Submission) -> Result<Option<SubmissionMetrics>>;

    /// Live class count, the slow path when metrics are missing.
    async fn count_classes(&self, submission: &Submission) -> Result<u64>;

    async fn set_cache_status(&self, submission: &Submission, status: AnnotatorCacheStatus) -> Result<()>;

    /// `(parent, child)` edges of the semantic-type tree.
    async fn semantic_type_edges(&self) -> Result<Vec<(String, String)>> {
        Ok(Vec::new())
    }
}
