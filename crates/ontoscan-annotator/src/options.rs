//! Per-call annotation options.

use ontoscan_common::{OntoscanError, Result};
use serde::{Deserialize, Serialize};

/// Deepest hierarchy expansion accepted per call.
pub const MAX_HIERARCHY_LEVELS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotateOptions {
    /// Allow-list by full ontology id or acronym; empty means all.
    pub ontologies: Vec<String>,
    /// Classes must carry at least one of these codes; empty means all.
    pub semantic_types: Vec<String>,
    pub use_semantic_types_hierarchy: bool,
    pub filter_integers: bool,
    pub min_term_size: Option<usize>,
    pub whole_word_only: bool,
    pub with_synonyms: bool,
    pub longest_only: bool,
    /// 0 disables hierarchy expansion.
    pub expand_hierarchy_levels: u32,
    pub expand_with_mappings: bool,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            ontologies: Vec::new(),
            semantic_types: Vec::new(),
            use_semantic_types_hierarchy: false,
            filter_integers: false,
            min_term_size: None,
            whole_word_only: true,
            with_synonyms: true,
            longest_only: false,
            expand_hierarchy_levels: 0,
            expand_with_mappings: false,
        }
    }
}

impl AnnotateOptions {
    pub fn validate(&self) -> Result<()> {
        if self.expand_hierarchy_levels > MAX_HIERARCHY_LEVELS {
            return Err(OntoscanError::InvalidArgument(format!(
                "expandHierarchyLevels must be at most {MAX_HIERARCHY_LEVELS}, got {}",
                self.expand_hierarchy_levels
            )));
        }
        if self.ontologies.iter().any(|o| o.trim().is_empty()) {
            return Err(OntoscanError::InvalidArgument("empty ontology in allow-list".into()));
        }
        Ok(())
    }

    pub fn with_ontologies<I, S>(mut self, ontologies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ontologies = ontologies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hierarchy(mut self, levels: u32) -> Self {
        self.expand_hierarchy_levels = levels;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = AnnotateOptions::default();
        assert!(opts.whole_word_only);
        assert!(opts.with_synonyms);
        assert!(!opts.longest_only);
        assert_eq!(opts.min_term_size, None);
        assert_eq!(opts.expand_hierarchy_levels, 0);
    }

    #[test]
    fn test_deserialize_partial_camel_case() {
        let opts: AnnotateOptions = serde_json::from_str(
            r#"{"ontologies": ["BRO"], "longestOnly": true, "minTermSize": 3}"#,
        )
        .unwrap();
        assert_eq!(opts.ontologies, vec!["BRO"]);
        assert!(opts.longest_only);
        assert_eq!(opts.min_term_size, Some(3));
        assert!(opts.with_synonyms);
    }

    #[test]
    fn test_validate_rejects_deep_hierarchy() {
        let opts = AnnotateOptions::default().with_hierarchy(MAX_HIERARCHY_LEVELS + 1);
        assert!(matches!(opts.validate(), Err(OntoscanError::InvalidArgument(_))));
        assert!(AnnotateOptions::default().with_hierarchy(5).validate().is_ok());
    }
}
