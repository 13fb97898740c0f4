//! Shared application state for the web server.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ontoscan_annotator::{Annotator, AnnotatorStack, TermCache};
use ontoscan_common::Settings;
use ontoscan_recommender::Recommender;

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub annotator: Arc<Annotator>,
    pub recommender: Arc<Recommender>,
    pub term_cache: Arc<TermCache>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(annotator: Arc<Annotator>, recommender: Arc<Recommender>, term_cache: Arc<TermCache>) -> Self {
        Self { annotator, recommender, term_cache, started_at: Utc::now() }
    }

    pub fn from_stack(stack: &AnnotatorStack, settings: &Settings) -> Self {
        let recommender = Recommender::new(stack.annotator.clone(), stack.catalog.clone())
            .with_hierarchy_levels(settings.recommender.hierarchy_levels);
        Self::new(stack.annotator.clone(), Arc::new(recommender), stack.term_cache.clone())
    }
}

pub type SharedState = Arc<AppState>;
