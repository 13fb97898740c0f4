//! Ontology ranking over annotator output.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ontoscan_annotator::{AnnotateOptions, Annotator, OntologyCatalog, SubmissionMetrics};
use ontoscan_common::{AnnotationKey, OntologyId, Result};
use tracing::{debug, warn};

use crate::recommendation::Recommendation;

pub const DEFAULT_HIERARCHY_LEVELS: u32 = 5;

pub struct Recommender {
    annotator: Arc<Annotator>,
    catalog: Arc<dyn OntologyCatalog>,
    hierarchy_levels: u32,
}

impl Recommender {
    pub fn new(annotator: Arc<Annotator>, catalog: Arc<dyn OntologyCatalog>) -> Self {
        Self { annotator, catalog, hierarchy_levels: DEFAULT_HIERARCHY_LEVELS }
    }

    pub fn with_hierarchy_levels(mut self, levels: u32) -> Self {
        self.hierarchy_levels = levels;
        self
    }

    /// Rank ontologies by how well they cover `text`, best first.
    ///
    /// Ontologies whose class count cannot be determined are left out.
    /// Ties keep the order in which ontologies were first matched.
    pub async fn recommend(
        &self,
        text: &str,
        ontologies: &[String],
        include_classes: bool,
    ) -> Result<Vec<Recommendation>> {
        let levels = if self.annotator.supports_hierarchy() {
            self.hierarchy_levels
        } else {
            if self.hierarchy_levels > 0 {
                warn!("No hierarchy graph configured, recommending without hierarchy expansion");
            }
            0
        };

        let options = AnnotateOptions {
            ontologies: ontologies.to_vec(),
            semantic_types: Vec::new(),
            with_synonyms: true,
            whole_word_only: true,
            expand_hierarchy_levels: levels,
            expand_with_mappings: false,
            ..AnnotateOptions::default()
        };
        let annotations = self.annotator.annotate(text, &options).await?;

        let mut order: Vec<OntologyId> = Vec::new();
        let mut by_ontology: HashMap<OntologyId, Recommendation> = HashMap::new();
        let mut skipped: HashSet<OntologyId> = HashSet::new();
        let mut matched: HashSet<AnnotationKey> = HashSet::new();

        for ann in &annotations {
            let ontology = ann.ontology();
            if skipped.contains(ontology) {
                continue;
            }

            if !by_ontology.contains_key(ontology) {
                let total = self.class_count(ontology).await;
                if total == 0 {
                    debug!(ontology = %ontology, "No class count, leaving ontology out");
                    skipped.insert(ontology.clone());
                    continue;
                }
                order.push(ontology.clone());
                by_ontology.insert(ontology.clone(), Recommendation::new(ontology.clone(), total));
            }

            let Some(rec) = by_ontology.get_mut(ontology) else {
                continue;
            };
            if matched.insert(ann.key()) {
                rec.num_terms_matched += 1;
                if include_classes {
                    rec.annotated_classes.push(ann.annotated_class.clone());
                }
            }
            rec.increment_score(ann);
        }

        let mut ranked: Vec<Recommendation> = order
            .into_iter()
            .filter_map(|id| by_ontology.remove(&id))
            .map(|mut rec| {
                rec.normalize();
                rec
            })
            .collect();
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        debug!(
            annotations = annotations.len(),
            ontologies = ranked.len(),
            skipped = skipped.len(),
            "Recommendation done"
        );
        Ok(ranked)
    }

    /// Class total from the latest submission's metrics, falling back to a
    /// live count. 0 when there is no submission or nothing could be read.
    async fn class_count(&self, ontology: &OntologyId) -> u64 {
        let submission = match self.catalog.latest_submission(ontology).await {
            Ok(Some(sub)) => sub,
            Ok(None) => return 0,
            Err(e) => {
                warn!("Unable to retrieve latest submission for {}: {}", ontology, e);
                return 0;
            }
        };

        match self.catalog.metrics(&submission).await {
            Ok(Some(SubmissionMetrics { classes: Some(classes) })) => return classes.max(0) as u64,
            Ok(_) => {}
            Err(e) => warn!("Unable to retrieve metrics for {}: {}", submission, e),
        }

        match self.catalog.count_classes(&submission).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Unable to count classes for {}: {}", submission, e);
                0
            }
        }
    }
}
