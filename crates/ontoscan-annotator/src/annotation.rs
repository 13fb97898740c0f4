//! Annotation result model.

use ontoscan_common::{AnnotationKey, ClassRef, MatchType, OntologyId};
use serde::{Deserialize, Serialize};

/// One matched span of the input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub from: usize,
    pub to: usize,
    pub match_type: MatchType,
    pub text: String,
}

/// An ancestor of the annotated class, `distance` >= 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyEntry {
    pub annotated_class: ClassRef,
    pub distance: u32,
}

/// Every span resolving to the same `(ontology, class)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub annotated_class: ClassRef,
    pub annotations: Vec<Occurrence>,
    /// Nearest ancestors first.
    pub hierarchy: Vec<HierarchyEntry>,
    pub mappings: Vec<ClassRef>,
}

impl Annotation {
    pub fn new(class_id: impl Into<String>, ontology: OntologyId) -> Self {
        Self {
            annotated_class: ClassRef { id: class_id.into(), ontology },
            annotations: Vec::new(),
            hierarchy: Vec::new(),
            mappings: Vec::new(),
        }
    }

    pub fn key(&self) -> AnnotationKey {
        self.annotated_class.key()
    }

    pub fn class_id(&self) -> &str {
        &self.annotated_class.id
    }

    pub fn ontology(&self) -> &OntologyId {
        &self.annotated_class.ontology
    }

    pub fn add_annotation(&mut self, from: usize, to: usize, match_type: MatchType, text: impl Into<String>) {
        self.annotations.push(Occurrence { from, to, match_type, text: text.into() });
    }

    /// Attach an ancestor in this annotation's ontology. Returns false when
    /// the parent is already in the hierarchy (the walk stops there).
    pub fn add_parent(&mut self, parent_id: &str, distance: u32) -> bool {
        if self.has_parent(parent_id) {
            return false;
        }
        self.hierarchy.push(HierarchyEntry {
            annotated_class: ClassRef {
                id: parent_id.to_string(),
                ontology: self.annotated_class.ontology.clone(),
            },
            distance,
        });
        true
    }

    pub fn has_parent(&self, parent_id: &str) -> bool {
        self.hierarchy.iter().any(|h| h.annotated_class.id == parent_id)
    }

    /// Returns false for a class already mapped.
    pub fn add_mapping(&mut self, class: ClassRef) -> bool {
        if self.mappings.contains(&class) {
            return false;
        }
        self.mappings.push(class);
        true
    }
}
