//! Subclass graph access for hierarchy expansion.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use ontoscan_common::{OntologyId, OntoscanError, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

/// Universal top concept, never reported as a parent.
pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";

/// One `child rdfs:subClassOf parent` edge and the named graph it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorRow {
    pub child: String,
    pub parent: String,
    pub graph: String,
}

#[async_trait]
pub trait HierarchyGraph: Send + Sync {
    /// Direct parents of `class_ids` within the submission graphs of
    /// `ontologies`, one batched query. Blank-node parents and
    /// [`OWL_THING`] are excluded.
    async fn ancestors(&self, class_ids: &[String], ontologies: &[OntologyId]) -> Result<Vec<AncestorRow>>;
}

// ── SPARQL endpoint ─────────────────────────────────────────────────────────

pub struct SparqlGraph {
    client: reqwest::Client,
    endpoint: String,
}

impl SparqlGraph {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client, endpoint: endpoint.into() })
    }
}

fn iri_pattern() -> &'static Regex {
    static IRI: OnceLock<Regex> = OnceLock::new();
    IRI.get_or_init(|| Regex::new(r#"^[^\s<>"{}|\\^`]+$"#).expect("valid IRI regex"))
}

/// True when the string can be embedded as `<iri>` in a query.
pub fn is_safe_iri(iri: &str) -> bool {
    iri_pattern().is_match(iri)
}

/// Build the batched ancestor query. Returns `None` when no id is usable.
pub fn ancestors_query(class_ids: &[String], ontologies: &[OntologyId]) -> Option<String> {
    let values: Vec<String> = class_ids
        .iter()
        .filter(|id| {
            let ok = is_safe_iri(id);
            if !ok {
                warn!(class = %id, "Skipping class id that is not a valid IRI");
            }
            ok
        })
        .map(|id| format!("<{id}>"))
        .collect();
    if values.is_empty() {
        return None;
    }

    let graph_filter = ontologies
        .iter()
        .map(|o| format!("STRSTARTS(STR(?graph), \"{}\")", o.as_str().replace('"', "")))
        .collect::<Vec<_>>()
        .join(" || ");

    let mut query = String::from(
        "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>\n\
         SELECT DISTINCT ?child ?parent ?graph WHERE {\n",
    );
    query.push_str(&format!("  VALUES ?child {{ {} }}\n", values.join(" ")));
    query.push_str("  GRAPH ?graph { ?child rdfs:subClassOf ?parent . }\n");
    query.push_str("  FILTER (!isBlank(?parent))\n");
    query.push_str(&format!("  FILTER (?parent != <{OWL_THING}>)\n"));
    if !graph_filter.is_empty() {
        query.push_str(&format!("  FILTER ({graph_filter})\n"));
    }
    query.push('}');
    Some(query)
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    bindings: Vec<std::collections::HashMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    #[serde(rename = "type")]
    kind: String,
    value: String,
}

/// Parse `application/sparql-results+json` into rows.
pub fn parse_ancestor_results(body: &str) -> Result<Vec<AncestorRow>> {
    let parsed: SparqlResults = serde_json::from_str(body)?;
    let mut rows = Vec::with_capacity(parsed.results.bindings.len());
    for binding in parsed.results.bindings {
        let (Some(child), Some(parent), Some(graph)) =
            (binding.get("child"), binding.get("parent"), binding.get("graph"))
        else {
            continue;
        };
        if parent.kind == "bnode" || parent.value == OWL_THING {
            continue;
        }
        rows.push(AncestorRow {
            child: child.value.clone(),
            parent: parent.value.clone(),
            graph: graph.value.clone(),
        });
    }
    Ok(rows)
}

#[async_trait]
impl HierarchyGraph for SparqlGraph {
    async fn ancestors(&self, class_ids: &[String], ontologies: &[OntologyId]) -> Result<Vec<AncestorRow>> {
        let Some(query) = ancestors_query(class_ids, ontologies) else {
            return Ok(Vec::new());
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/sparql-results+json")
            .form(&[("query", query.as_str())])
            .send()
            .await
            .map_err(|e| OntoscanError::Graph(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(OntoscanError::Graph(format!("SPARQL endpoint returned {status}: {body}")));
        }

        let body = resp.text().await?;
        let rows = parse_ancestor_results(&body)
            .map_err(|e| OntoscanError::Graph(format!("unreadable SPARQL results: {e}")))?;
        debug!(classes = class_ids.len(), rows = rows.len(), "Ancestor query answered");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_shape() {
        let ids = vec!["http://bro#Data_Storage".to_string(), "bad iri>".to_string()];
        let onts = vec![OntologyId::new("http://data.bioontology.org/ontologies/BRO")];
        let q = ancestors_query(&ids, &onts).unwrap();
        assert!(q.contains("VALUES ?child { <http://bro#Data_Storage> }"));
        assert!(q.contains("!isBlank(?parent)"));
        assert!(q.contains(OWL_THING));
        assert!(q.contains("STRSTARTS(STR(?graph), \"http://data.bioontology.org/ontologies/BRO\")"));
    }

    #[test]
    fn test_query_none_without_valid_ids() {
        assert!(ancestors_query(&["<nope>".to_string()], &[]).is_none());
        assert!(ancestors_query(&[], &[]).is_none());
    }

    #[test]
    fn test_parse_results_filters_blank_and_thing() {
        let body = r#"{
            "head": {"vars": ["child", "parent", "graph"]},
            "results": {"bindings": [
                {"child": {"type": "uri", "value": "http://bro#A"},
                 "parent": {"type": "uri", "value": "http://bro#B"},
                 "graph": {"type": "uri", "value": "http://data.bioontology.org/ontologies/BRO/submissions/1"}},
                {"child": {"type": "uri", "value": "http://bro#A"},
                 "parent": {"type": "bnode", "value": "b0"},
                 "graph": {"type": "uri", "value": "http://data.bioontology.org/ontologies/BRO/submissions/1"}},
                {"child": {"type": "uri", "value": "http://bro#B"},
                 "parent": {"type": "uri", "value": "http://www.w3.org/2002/07/owl#Thing"},
                 "graph": {"type": "uri", "value": "http://data.bioontology.org/ontologies/BRO/submissions/1"}}
            ]}
        }"#;
        let rows = parse_ancestor_results(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].parent, "http://bro#B");
    }
}
