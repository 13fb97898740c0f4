//! Cross-ontology mapping expansion.

use std::collections::HashMap;

use async_trait::async_trait;
use ontoscan_common::{ontology_allowed, AnnotationKey, ClassRef, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::annotation::Annotation;

/// A mapping between equivalent classes and the process that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMapping {
    pub source: String,
    pub terms: Vec<ClassRef>,
}

#[async_trait]
pub trait MappingSource: Send + Sync {
    /// Mappings touching any of `classes`, one batched lookup.
    /// Mappings whose source is in `excluded_sources` may be omitted.
    async fn mappings_for(&self, classes: &[ClassRef], excluded_sources: &[String]) -> Result<Vec<TermMapping>>;
}

/// Attach mapped classes to each annotation.
///
/// A mapping applies to an annotation when it lists the annotation's class
/// and exactly one other term; that other term must pass the ontology
/// allow-list.
pub async fn expand_mappings(
    source: &dyn MappingSource,
    annotations: &mut [Annotation],
    ontology_filter: &[String],
    excluded_sources: &[String],
) -> Result<()> {
    if annotations.is_empty() {
        return Ok(());
    }

    let mut index: HashMap<AnnotationKey, Vec<usize>> = HashMap::new();
    let mut classes: Vec<ClassRef> = Vec::new();
    for (i, ann) in annotations.iter().enumerate() {
        index.entry(ann.key()).or_default().push(i);
        if !classes.contains(&ann.annotated_class) {
            classes.push(ann.annotated_class.clone());
        }
    }

    let mappings = source.mappings_for(&classes, excluded_sources).await?;
    let mut attached = 0usize;

    for mapping in &mappings {
        if excluded_sources.iter().any(|s| s == &mapping.source) {
            continue;
        }
        for term in &mapping.terms {
            let Some(owners) = index.get(&term.key()) else {
                continue;
            };
            let others: Vec<&ClassRef> = mapping.terms.iter().filter(|t| *t != term).collect();
            if others.len() != 1 {
                warn!(source = %mapping.source, terms = mapping.terms.len(), "Skipping malformed mapping");
                continue;
            }
            let target = others[0];
            if !ontology_allowed(ontology_filter, &target.ontology) {
                continue;
            }
            for &i in owners {
                if annotations[i].add_mapping(target.clone()) {
                    attached += 1;
                }
            }
        }
    }

    debug!(mappings = mappings.len(), attached, "Mapping expansion done");
    Ok(())
}
