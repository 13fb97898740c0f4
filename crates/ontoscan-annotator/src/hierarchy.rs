//! Level-by-level ancestor expansion.
//!
//! Level 1 seeds are the annotated classes, level k seeds are the parents
//! attached at level k-1. Each level is one batched graph query. A seed
//! class can be shared by several annotations (reached through different
//! chains), so seeds index every annotation they belong to.

use std::collections::HashMap;

use ontoscan_common::{ontology_allowed, AnnotationKey, OntologyId, Result};
use tracing::debug;

use crate::annotation::Annotation;
use crate::graph::HierarchyGraph;

pub async fn expand_hierarchy(
    graph: &dyn HierarchyGraph,
    annotations: &mut [Annotation],
    levels: u32,
    ontology_filter: &[String],
) -> Result<()> {
    if levels == 0 || annotations.is_empty() {
        return Ok(());
    }

    let mut ontologies: Vec<OntologyId> = Vec::new();
    for ann in annotations.iter() {
        let ont = ann.ontology();
        if ontology_allowed(ontology_filter, ont) && !ontologies.contains(ont) {
            ontologies.push(ont.clone());
        }
    }
    if ontologies.is_empty() {
        return Ok(());
    }

    // Class key -> annotations that reach this class.
    let mut frontier: HashMap<AnnotationKey, Vec<usize>> = HashMap::new();
    for (i, ann) in annotations.iter().enumerate() {
        if ontologies.contains(ann.ontology()) {
            frontier.entry(ann.key()).or_default().push(i);
        }
    }

    for level in 1..=levels {
        let mut class_ids: Vec<String> = frontier.keys().map(|k| k.class_id.clone()).collect();
        class_ids.sort();
        class_ids.dedup();

        let rows = graph.ancestors(&class_ids, &ontologies).await?;
        let mut next: HashMap<AnnotationKey, Vec<usize>> = HashMap::new();
        let mut attached = 0usize;

        for row in rows {
            let Some(ontology) = ontologies.iter().find(|o| o.owns_graph(&row.graph)) else {
                continue;
            };
            let child = AnnotationKey::new(ontology.clone(), row.child);
            let Some(owners) = frontier.get(&child) else {
                continue;
            };

            for &i in owners {
                if annotations[i].add_parent(&row.parent, level) {
                    attached += 1;
                    let seeds = next
                        .entry(AnnotationKey::new(ontology.clone(), row.parent.clone()))
                        .or_default();
                    if !seeds.contains(&i) {
                        seeds.push(i);
                    }
                }
            }
        }

        debug!(level, seeds = class_ids.len(), attached, "Hierarchy level expanded");
        if attached == 0 {
            break;
        }
        frontier = next;
    }

    Ok(())
}
