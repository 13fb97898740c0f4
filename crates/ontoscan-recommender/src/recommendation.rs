use ontoscan_annotator::Annotation;
use ontoscan_common::{ClassRef, MatchType, OntologyId};
use serde::{Deserialize, Serialize};

use crate::normalise::normalise_by_size;

pub const PREF_POINTS: f64 = 10.0;
pub const SYN_POINTS: f64 = 5.0;
pub const HIERARCHY_POINTS: f64 = 2.0;

/// Per-ontology aggregate produced by the recommender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub ontology: OntologyId,
    pub score: f64,
    /// Distinct classes of this ontology found in the text.
    pub num_terms_matched: usize,
    pub num_terms_total: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotated_classes: Vec<ClassRef>,
}

impl Recommendation {
    pub fn new(ontology: OntologyId, num_terms_total: u64) -> Self {
        Self {
            ontology,
            score: 0.0,
            num_terms_matched: 0,
            num_terms_total,
            annotated_classes: Vec::new(),
        }
    }

    /// Add the points earned by one annotation: per occurrence by match
    /// type, plus a flat amount per hierarchy entry.
    pub fn increment_score(&mut self, annotation: &Annotation) {
        for occ in &annotation.annotations {
            self.score += match occ.match_type {
                MatchType::Preferred => PREF_POINTS,
                MatchType::Synonym => SYN_POINTS,
            };
        }
        self.score += HIERARCHY_POINTS * annotation.hierarchy.len() as f64;
    }

    pub fn normalize(&mut self) {
        self.score = normalise_by_size(self.score, self.num_terms_total);
    }
}
