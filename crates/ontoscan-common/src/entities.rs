//! Core vocabulary types shared by the annotator and the recommender.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OntoscanError;

// ---------------------------------------------------------------------------
// Ontology identifier
// ---------------------------------------------------------------------------

/// Canonical ontology identifier, e.g. `http://data.bioontology.org/ontologies/BRO`.
///
/// The last path segment is the ontology acronym. Submission graph URIs are
/// prefixed by this id, which is how graph rows are attributed back to an
/// ontology.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OntologyId(String);

impl OntologyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short acronym: the last non-empty `/`-separated segment of the id.
    pub fn acronym(&self) -> &str {
        self.0
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.0)
    }

    /// True when `filter` names this ontology by full id or by acronym.
    pub fn matches(&self, filter: &str) -> bool {
        filter == self.0 || filter == self.acronym()
    }

    /// True when `graph` is one of this ontology's submission graphs.
    pub fn owns_graph(&self, graph: &str) -> bool {
        match graph.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl fmt::Display for OntologyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OntologyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for OntologyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// True when `filter` is empty or names `ontology` by id or acronym.
pub fn ontology_allowed(filter: &[String], ontology: &OntologyId) -> bool {
    filter.is_empty() || filter.iter().any(|f| ontology.matches(f))
}

// ---------------------------------------------------------------------------
// Class reference
// ---------------------------------------------------------------------------

/// A class in a specific ontology.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassRef {
    pub id: String,
    pub ontology: OntologyId,
}

impl ClassRef {
    pub fn new(id: impl Into<String>, ontology: impl Into<OntologyId>) -> Self {
        Self { id: id.into(), ontology: ontology.into() }
    }

    pub fn key(&self) -> AnnotationKey {
        AnnotationKey::new(self.ontology.clone(), self.id.clone())
    }
}

/// Composite grouping key for annotations: one Annotation per (ontology, class).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationKey {
    pub ontology: OntologyId,
    pub class_id: String,
}

impl AnnotationKey {
    pub fn new(ontology: OntologyId, class_id: String) -> Self {
        Self { ontology, class_id }
    }
}

// ---------------------------------------------------------------------------
// Match type
// ---------------------------------------------------------------------------

/// How a surface term matched a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    #[serde(rename = "PREF")]
    Preferred,
    #[serde(rename = "SYN")]
    Synonym,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Preferred => "PREF",
            MatchType::Synonym => "SYN",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = OntoscanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PREF" => Ok(MatchType::Preferred),
            "SYN" => Ok(MatchType::Synonym),
            other => Err(OntoscanError::InvalidArgument(format!(
                "Invalid annotation type: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acronym_from_id() {
        let id = OntologyId::new("http://data.bioontology.org/ontologies/BROTEST-0");
        assert_eq!(id.acronym(), "BROTEST-0");
        assert!(id.matches("BROTEST-0"));
        assert!(id.matches("http://data.bioontology.org/ontologies/BROTEST-0"));
        assert!(!id.matches("BRO"));

        let trailing = OntologyId::new("http://example.org/ontologies/GO/");
        assert_eq!(trailing.acronym(), "GO");
    }

    #[test]
    fn test_owns_graph() {
        let id = OntologyId::new("http://data.bioontology.org/ontologies/BRO");
        assert!(id.owns_graph("http://data.bioontology.org/ontologies/BRO/submissions/3"));
        assert!(!id.owns_graph("http://data.bioontology.org/ontologies/GO/submissions/1"));
        assert!(!id.owns_graph("http://data.bioontology.org/ontologies/BROTEST/submissions/1"));
    }

    #[test]
    fn test_match_type_parse() {
        assert_eq!("PREF".parse::<MatchType>().unwrap(), MatchType::Preferred);
        assert_eq!("SYN".parse::<MatchType>().unwrap(), MatchType::Synonym);

        let err = "LABEL".parse::<MatchType>().unwrap_err();
        assert!(matches!(err, OntoscanError::InvalidArgument(_)));
    }

    #[test]
    fn test_match_type_serde_tags() {
        let json = serde_json::to_string(&MatchType::Synonym).unwrap();
        assert_eq!(json, "\"SYN\"");
        assert!(serde_json::from_str::<MatchType>("\"OTHER\"").is_err());
    }

    #[test]
    fn test_ontology_filter() {
        let id = OntologyId::new("http://data.bioontology.org/ontologies/BRO");
        assert!(ontology_allowed(&[], &id));
        assert!(ontology_allowed(&["BRO".to_string()], &id));
        assert!(!ontology_allowed(&["DOES-NOT-EXIST".to_string()], &id));
    }
}
