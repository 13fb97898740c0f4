//! Wiring of the annotator components from [`Settings`].

use std::sync::Arc;

use ontoscan_common::settings::StopWordList;
use ontoscan_common::{Result, Settings};
use tracing::{info, warn};

use crate::annotator::Annotator;
use crate::catalog::OntologyCatalog;
use crate::corpus::{CorpusDocument, OntologyCorpus};
use crate::filter::StopWords;
use crate::graph::{HierarchyGraph, SparqlGraph};
use crate::instance::CacheInstances;
use crate::recognizer;
use crate::semantic_types::SemanticTypeTree;
use crate::store::{self, CacheStore};
use crate::term_cache::TermCache;

/// Cache store, catalog and term cache. Enough for build, export and
/// instance switching; no span matcher is contacted.
///
/// Without a Redis URL the store lives in memory and is populated from
/// the corpus on construction (and the dictionary exported, when a path
/// is configured).
pub struct CacheStack {
    pub store: Arc<dyn CacheStore>,
    pub corpus: Arc<OntologyCorpus>,
    pub term_cache: Arc<TermCache>,
}

impl CacheStack {
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let corpus = match &settings.corpus.path {
            Some(path) => Arc::new(OntologyCorpus::from_path(path)?),
            None => {
                warn!("No corpus.path configured, catalog is empty");
                Arc::new(OntologyCorpus::new(CorpusDocument::default()))
            }
        };

        let store = store::from_config(&settings.cache).await?;
        let instances = CacheInstances::new(store.clone(), &settings.cache);
        let term_cache = Arc::new(TermCache::new(instances, corpus.clone(), &settings.cache));

        // An in-process store starts empty; fill it so the stack can serve.
        if settings.cache.redis_url.is_none() && !corpus.document().ontologies.is_empty() {
            let instance = term_cache.instances().current().await?;
            info!("In-memory cache store, building term cache {} from the corpus", instance);
            term_cache.seed_current_instance().await?;
            if let Some(path) = &settings.dictionary.path {
                term_cache.generate_dictionary_file(&instance, path).await?;
            }
        }

        Ok(Self { store, corpus, term_cache })
    }
}

/// Everything a surface (web, CLI) needs to serve annotate calls.
pub struct AnnotatorStack {
    pub store: Arc<dyn CacheStore>,
    pub catalog: Arc<dyn OntologyCatalog>,
    pub term_cache: Arc<TermCache>,
    pub annotator: Arc<Annotator>,
}

impl AnnotatorStack {
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let CacheStack { store, corpus, term_cache } = CacheStack::from_settings(settings).await?;
        let catalog: Arc<dyn OntologyCatalog> = corpus.clone();

        let graph: Arc<dyn HierarchyGraph> = match &settings.graph.sparql_endpoint {
            Some(endpoint) => {
                info!(endpoint = %endpoint, "Using SPARQL endpoint for hierarchy expansion");
                Arc::new(SparqlGraph::new(endpoint.clone())?)
            }
            None => corpus.clone(),
        };

        let stop_words = match &settings.annotator.stop_words {
            Some(StopWordList::List(words)) => StopWords::from_list(words),
            Some(StopWordList::Csv(csv)) => StopWords::from_csv(csv),
            None => StopWords::bundled(),
        };
        let semantic_types = SemanticTypeTree::from_edges(catalog.semantic_type_edges().await?);

        let annotator = Annotator::builder(recognizer::from_settings(settings)?, term_cache.clone())
            .stop_words(stop_words)
            .graph(graph)
            .mappings(corpus)
            .semantic_types(semantic_types)
            .excluded_mapping_sources(settings.annotator.excluded_mapping_sources.clone())
            .build();

        Ok(Self { store, catalog, term_cache, annotator: Arc::new(annotator) })
    }
}
