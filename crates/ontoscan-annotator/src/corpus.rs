//! File-backed ontology corpus (JSON or YAML).
//!
//! A single document carries ontologies with their classes and subclass
//! edges, cross-ontology mappings and the semantic-type tree. It serves as
//! catalog, hierarchy graph and mapping source for local runs and tests.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use ontoscan_common::{AnnotationKey, ClassRef, OntologyId, OntoscanError, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::catalog::{
    AnnotatorCacheStatus, ClassPage, OntologyCatalog, OntologyClass, Submission, SubmissionMetrics,
};
use crate::graph::{AncestorRow, HierarchyGraph, OWL_THING};
use crate::mappings::{MappingSource, TermMapping};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusDocument {
    #[serde(default)]
    pub ontologies: Vec<CorpusOntology>,
    #[serde(default)]
    pub mappings: Vec<TermMapping>,
    #[serde(default)]
    pub semantic_types: Vec<SemanticTypeEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusOntology {
    pub id: OntologyId,
    /// Latest submission; absent means the ontology has none yet.
    #[serde(default)]
    pub submission_id: Option<u32>,
    #[serde(default)]
    pub metrics: Option<SubmissionMetrics>,
    #[serde(default)]
    pub classes: Vec<CorpusClass>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusClass {
    #[serde(flatten)]
    pub class: OntologyClass,
    #[serde(default)]
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticTypeEdge {
    pub parent: String,
    pub child: String,
}

pub struct OntologyCorpus {
    doc: CorpusDocument,
    /// (ontology, class) -> (ontology index, class index)
    class_index: HashMap<AnnotationKey, (usize, usize)>,
    statuses: RwLock<HashMap<OntologyId, AnnotatorCacheStatus>>,
}

impl OntologyCorpus {
    pub fn new(doc: CorpusDocument) -> Self {
        let mut class_index = HashMap::new();
        for (oi, ont) in doc.ontologies.iter().enumerate() {
            for (ci, cls) in ont.classes.iter().enumerate() {
                class_index.insert(AnnotationKey::new(ont.id.clone(), cls.class.id.clone()), (oi, ci));
            }
        }
        Self { doc, class_index, statuses: RwLock::new(HashMap::new()) }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let doc = serde_yaml::from_str(yaml)
            .map_err(|e| OntoscanError::Config(format!("invalid corpus YAML: {e}")))?;
        Ok(Self::new(doc))
    }

    /// Load by extension: `.yaml`/`.yml` as YAML, anything else as JSON.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OntoscanError::Config(format!("cannot read corpus {}: {e}", path.display()))
        })?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let corpus = if is_yaml {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };
        info!(
            "Loaded corpus {}: {} ontologies, {} mappings",
            path.display(),
            corpus.doc.ontologies.len(),
            corpus.doc.mappings.len()
        );
        Ok(corpus)
    }

    pub fn document(&self) -> &CorpusDocument {
        &self.doc
    }

    pub async fn cache_status(&self, ontology: &OntologyId) -> Option<AnnotatorCacheStatus> {
        self.statuses.read().await.get(ontology).cloned()
    }

    fn ontology(&self, id: &OntologyId) -> Option<&CorpusOntology> {
        self.doc.ontologies.iter().find(|o| &o.id == id)
    }
}

#[async_trait]
impl OntologyCatalog for OntologyCorpus {
    async fn ontologies(&self) -> Result<Vec<OntologyId>> {
        Ok(self.doc.ontologies.iter().map(|o| o.id.clone()).collect())
    }

    async fn latest_submission(&self, ontology: &OntologyId) -> Result<Option<Submission>> {
        Ok(self.ontology(ontology).and_then(|o| {
            o.submission_id.map(|submission_id| Submission { ontology: o.id.clone(), submission_id })
        }))
    }

    async fn class_page(&self, submission: &Submission, page: usize, size: usize) -> Result<ClassPage> {
        let ont = self.ontology(&submission.ontology).ok_or_else(|| {
            OntoscanError::Catalog(format!("unknown ontology {}", submission.ontology))
        })?;
        let size = size.max(1);
        let start = page.saturating_sub(1) * size;
        let classes = ont.classes.iter().skip(start).take(size).map(|c| c.class.clone()).collect();
        let next_page = (start + size < ont.classes.len()).then_some(page + 1);
        Ok(ClassPage { classes, next_page })
    }

    async fn metrics(&self, submission: &Submission) -> Result<Option<SubmissionMetrics>> {
        Ok(self.ontology(&submission.ontology).and_then(|o| o.metrics.clone()))
    }

    async fn count_classes(&self, submission: &Submission) -> Result<u64> {
        Ok(self
            .ontology(&submission.ontology)
            .map(|o| o.classes.len() as u64)
            .unwrap_or(0))
    }

    async fn set_cache_status(&self, submission: &Submission, status: AnnotatorCacheStatus) -> Result<()> {
        self.statuses.write().await.insert(submission.ontology.clone(), status);
        Ok(())
    }

    async fn semantic_type_edges(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .doc
            .semantic_types
            .iter()
            .map(|e| (e.parent.clone(), e.child.clone()))
            .collect())
    }
}

#[async_trait]
impl HierarchyGraph for OntologyCorpus {
    async fn ancestors(&self, class_ids: &[String], ontologies: &[OntologyId]) -> Result<Vec<AncestorRow>> {
        let mut rows = Vec::new();
        for ontology in ontologies {
            let Some(ont) = self.ontology(ontology) else { continue };
            let Some(submission_id) = ont.submission_id else { continue };
            let graph = Submission { ontology: ont.id.clone(), submission_id }.graph_uri();

            for class_id in class_ids {
                let key = AnnotationKey::new(ont.id.clone(), class_id.clone());
                let Some(&(oi, ci)) = self.class_index.get(&key) else { continue };
                for parent in &self.doc.ontologies[oi].classes[ci].parents {
                    if parent.starts_with("_:") || parent == OWL_THING {
                        continue;
                    }
                    rows.push(AncestorRow {
                        child: class_id.clone(),
                        parent: parent.clone(),
                        graph: graph.clone(),
                    });
                }
            }
        }
        Ok(rows)
    }
}

#[async_trait]
impl MappingSource for OntologyCorpus {
    async fn mappings_for(&self, classes: &[ClassRef], excluded_sources: &[String]) -> Result<Vec<TermMapping>> {
        Ok(self
            .doc
            .mappings
            .iter()
            .filter(|m| !excluded_sources.contains(&m.source))
            .filter(|m| m.terms.iter().any(|t| classes.contains(t)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
ontologies:
  - id: http://data.bioontology.org/ontologies/BRO
    submission_id: 2
    classes:
      - id: http://bro#Data_Storage
        pref_label: Data Storage
        parents: ["http://bro#Resource", "_:b0", "http://www.w3.org/2002/07/owl#Thing"]
      - id: http://bro#Resource
        pref_label: Resource
  - id: http://data.bioontology.org/ontologies/EMPTY
mappings:
  - source: LOOM
    terms:
      - { id: "http://bro#Resource", ontology: "http://data.bioontology.org/ontologies/BRO" }
      - { id: "http://x#Resource", ontology: "http://data.bioontology.org/ontologies/X" }
semantic_types:
  - { parent: T001, child: T002 }
"#;

    #[tokio::test]
    async fn test_yaml_catalog() {
        let corpus = OntologyCorpus::from_yaml_str(YAML).unwrap();
        let ids = corpus.ontologies().await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(corpus.latest_submission(&ids[1]).await.unwrap().is_none());

        let sub = corpus.latest_submission(&ids[0]).await.unwrap().unwrap();
        assert_eq!(sub.graph_uri(), "http://data.bioontology.org/ontologies/BRO/submissions/2");

        let page = corpus.class_page(&sub, 1, 1).await.unwrap();
        assert_eq!(page.classes[0].pref_label.as_deref(), Some("Data Storage"));
        assert_eq!(page.next_page, Some(2));
        assert_eq!(corpus.class_page(&sub, 2, 1).await.unwrap().next_page, None);
        assert_eq!(corpus.count_classes(&sub).await.unwrap(), 2);
        assert_eq!(corpus.semantic_type_edges().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_graph_excludes_blank_and_thing() {
        let corpus = OntologyCorpus::from_yaml_str(YAML).unwrap();
        let bro = OntologyId::new("http://data.bioontology.org/ontologies/BRO");
        let rows = corpus
            .ancestors(&["http://bro#Data_Storage".to_string()], &[bro])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].parent, "http://bro#Resource");
    }

    #[tokio::test]
    async fn test_mappings_respect_exclusions() {
        let corpus = OntologyCorpus::from_yaml_str(YAML).unwrap();
        let cls = ClassRef::new("http://bro#Resource", "http://data.bioontology.org/ontologies/BRO");
        assert_eq!(corpus.mappings_for(&[cls.clone()], &[]).await.unwrap().len(), 1);
        assert!(corpus.mappings_for(&[cls], &["LOOM".to_string()]).await.unwrap().is_empty());
    }
}
