//! Annotation pipeline.
//!
//! text -> recognizer -> span filters -> term cache join -> optional
//! hierarchy expansion -> optional mapping expansion.

use std::sync::Arc;

use ontoscan_common::{OntoscanError, Result};
use tracing::{debug, info};

use crate::aggregator::{aggregate, AggregateFilter};
use crate::annotation::Annotation;
use crate::filter::{filter_integers, filter_min_size, filter_stop_words, StopWords};
use crate::graph::HierarchyGraph;
use crate::hierarchy::expand_hierarchy;
use crate::mappings::{expand_mappings, MappingSource};
use crate::options::AnnotateOptions;
use crate::recognizer::Recognizer;
use crate::semantic_types::SemanticTypeTree;
use crate::term_cache::TermCache;

pub struct Annotator {
    recognizer: Arc<dyn Recognizer>,
    term_cache: Arc<TermCache>,
    stop_words: StopWords,
    graph: Option<Arc<dyn HierarchyGraph>>,
    mappings: Option<Arc<dyn MappingSource>>,
    semantic_types: SemanticTypeTree,
    excluded_mapping_sources: Vec<String>,
}

pub struct AnnotatorBuilder {
    recognizer: Arc<dyn Recognizer>,
    term_cache: Arc<TermCache>,
    stop_words: Option<StopWords>,
    graph: Option<Arc<dyn HierarchyGraph>>,
    mappings: Option<Arc<dyn MappingSource>>,
    semantic_types: SemanticTypeTree,
    excluded_mapping_sources: Vec<String>,
}

impl AnnotatorBuilder {
    pub fn stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = Some(stop_words);
        self
    }

    pub fn graph(mut self, graph: Arc<dyn HierarchyGraph>) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn mappings(mut self, mappings: Arc<dyn MappingSource>) -> Self {
        self.mappings = Some(mappings);
        self
    }

    pub fn semantic_types(mut self, tree: SemanticTypeTree) -> Self {
        self.semantic_types = tree;
        self
    }

    pub fn excluded_mapping_sources(mut self, sources: Vec<String>) -> Self {
        self.excluded_mapping_sources = sources;
        self
    }

    pub fn build(self) -> Annotator {
        let stop_words = self.stop_words.unwrap_or_else(StopWords::bundled);
        info!(
            "Annotator ready: recognizer={}, {} stop words, hierarchy={}, mappings={}",
            self.recognizer.name(),
            stop_words.len(),
            self.graph.is_some(),
            self.mappings.is_some()
        );
        Annotator {
            recognizer: self.recognizer,
            term_cache: self.term_cache,
            stop_words,
            graph: self.graph,
            mappings: self.mappings,
            semantic_types: self.semantic_types,
            excluded_mapping_sources: self.excluded_mapping_sources,
        }
    }
}

impl Annotator {
    pub fn builder(recognizer: Arc<dyn Recognizer>, term_cache: Arc<TermCache>) -> AnnotatorBuilder {
        AnnotatorBuilder {
            recognizer,
            term_cache,
            stop_words: None,
            graph: None,
            mappings: None,
            semantic_types: SemanticTypeTree::default(),
            excluded_mapping_sources: vec!["LOOM".to_string()],
        }
    }

    pub fn term_cache(&self) -> &Arc<TermCache> {
        &self.term_cache
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    pub fn supports_hierarchy(&self) -> bool {
        self.graph.is_some()
    }

    /// Replace the stop-word list; an empty list disables the filter.
    pub fn set_stop_words(&mut self, stop_words: StopWords) {
        self.stop_words = stop_words;
    }

    /// Full pipeline including any requested expansion.
    pub async fn annotate(&self, text: &str, options: &AnnotateOptions) -> Result<Vec<Annotation>> {
        options.validate()?;
        if options.expand_hierarchy_levels > 0 && self.graph.is_none() {
            return Err(OntoscanError::Config(
                "hierarchy expansion requested but no hierarchy graph is configured".into(),
            ));
        }
        if options.expand_with_mappings && self.mappings.is_none() {
            return Err(OntoscanError::Config(
                "mapping expansion requested but no mapping source is configured".into(),
            ));
        }

        let mut annotations = self.annotate_direct(text, options).await?;

        if let Some(graph) = &self.graph {
            if options.expand_hierarchy_levels > 0 {
                expand_hierarchy(
                    graph.as_ref(),
                    &mut annotations,
                    options.expand_hierarchy_levels,
                    &options.ontologies,
                )
                .await?;
            }
        }

        if let Some(mappings) = &self.mappings {
            if options.expand_with_mappings {
                expand_mappings(
                    mappings.as_ref(),
                    &mut annotations,
                    &options.ontologies,
                    &self.excluded_mapping_sources,
                )
                .await?;
            }
        }

        Ok(annotations)
    }

    /// Lossy UTF-8 decode, then [`Annotator::annotate`].
    pub async fn annotate_bytes(&self, bytes: &[u8], options: &AnnotateOptions) -> Result<Vec<Annotation>> {
        let text = String::from_utf8_lossy(bytes);
        self.annotate(&text, options).await
    }

    /// Direct matches only, no expansion.
    pub async fn annotate_direct(&self, text: &str, options: &AnnotateOptions) -> Result<Vec<Annotation>> {
        options.validate()?;

        let mut spans = self
            .recognizer
            .recognize(text, options.longest_only, options.whole_word_only)
            .await?;
        let raw = spans.len();

        if options.filter_integers {
            spans = filter_integers(spans);
        }
        if let Some(min) = options.min_term_size {
            spans = filter_min_size(spans, min);
        }
        spans = filter_stop_words(spans, &self.stop_words);

        if spans.is_empty() {
            debug!(raw, "No spans left after filtering");
            return Ok(Vec::new());
        }

        let semantic_types = if options.use_semantic_types_hierarchy {
            self.semantic_types.expand(&options.semantic_types)
        } else {
            options.semantic_types.clone()
        };

        let instance = self.term_cache.instances().current().await?;
        let fingerprints: Vec<u32> = spans.iter().map(|s| s.fingerprint).collect();
        let records = self.term_cache.lookup_many(&instance, &fingerprints).await?;

        let filter = AggregateFilter {
            ontologies: &options.ontologies,
            semantic_types: &semantic_types,
            with_synonyms: options.with_synonyms,
            longest_only: options.longest_only,
        };
        let annotations = aggregate(&spans, &records, &filter);

        debug!(
            raw,
            kept = spans.len(),
            annotations = annotations.len(),
            instance = %instance,
            "Direct annotation done"
        );
        Ok(annotations)
    }
}
