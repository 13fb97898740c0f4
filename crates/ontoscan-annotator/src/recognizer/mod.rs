//! Span recognizers.
//!
//! A recognizer turns text into raw spans keyed by term fingerprint. Three
//! backends share the same contract and offset convention:
//! - [`MgrepClient`]: the line-oriented TCP span matcher
//! - [`RestRecognizer`]: the same row format over HTTP
//! - [`DictionaryRecognizer`]: in-process Aho-Corasick over the dictionary export

pub mod dictionary;
pub mod mgrep;
pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use ontoscan_common::settings::{MatcherConfig, MatcherKind};
use ontoscan_common::{OntoscanError, Result, Settings};

use crate::span::RawSpan;

pub use dictionary::DictionaryRecognizer;
pub use mgrep::{MgrepClient, MgrepEndpoint};
pub use rest::RestRecognizer;

#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Candidate spans for `text`. Blank text yields no spans.
    async fn recognize(
        &self,
        text: &str,
        longest_only: bool,
        whole_word_only: bool,
    ) -> Result<Vec<RawSpan>>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Build the recognizer selected by `[matcher] kind`.
pub fn from_settings(settings: &Settings) -> Result<Arc<dyn Recognizer>> {
    let matcher: &MatcherConfig = &settings.matcher;
    match matcher.kind {
        MatcherKind::Mgrep => Ok(Arc::new(MgrepClient::from_config(matcher))),
        MatcherKind::Rest => {
            let url = matcher.rest_url.clone().ok_or_else(|| {
                OntoscanError::Config("matcher.rest_url is required for the rest recognizer".into())
            })?;
            Ok(Arc::new(RestRecognizer::new(url)?))
        }
        MatcherKind::Dictionary => {
            let path = settings.require_dictionary_path()?;
            Ok(Arc::new(DictionaryRecognizer::from_file(path)?))
        }
    }
}
