//! Configuration loading for ontoscan.
//! Reads ontoscan.toml from the current directory or the path in the ONTOSCAN_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{OntoscanError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    #[serde(default)]
    pub annotator: AnnotatorConfig,
    #[serde(default)]
    pub recommender: RecommenderConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Which recognizer backs the span matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    #[default]
    Mgrep,
    Rest,
    Dictionary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default)]
    pub kind: MatcherKind,
    #[serde(default = "default_matcher_host")]
    pub host: String,
    #[serde(default = "default_matcher_port")]
    pub port: u16,
    #[serde(default = "default_matcher_host")]
    pub alt_host: String,
    #[serde(default = "default_matcher_port")]
    pub alt_port: u16,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
    pub rest_url: Option<String>,
}

fn default_matcher_host()    -> String { "localhost".to_string() }
fn default_matcher_port()    -> u16    { 55555 }
fn default_connect_timeout() -> u64    { 5_000 }
fn default_read_timeout()    -> u64    { 30_000 }

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            kind: MatcherKind::default(),
            host: default_matcher_host(),
            port: default_matcher_port(),
            alt_host: default_matcher_host(),
            alt_port: default_matcher_port(),
            connect_timeout_ms: default_connect_timeout(),
            read_timeout_ms: default_read_timeout(),
            rest_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_alt_prefix")]
    pub alt_prefix: String,
    #[serde(default = "default_pointer_key")]
    pub pointer_key: String,
    #[serde(default = "default_expire_grace")]
    pub expire_grace_secs: u64,
    #[serde(default = "default_key_batch")]
    pub key_batch_size: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_min_term_length")]
    pub min_term_length: usize,
}

fn default_prefix()          -> String { "c1:".to_string() }
fn default_alt_prefix()      -> String { "c2:".to_string() }
fn default_pointer_key()     -> String { "current_instance".to_string() }
fn default_expire_grace()    -> u64    { 300 }
fn default_key_batch()       -> usize  { 500 }
fn default_page_size()       -> usize  { 2500 }
fn default_min_term_length() -> usize  { 2 }

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            prefix: default_prefix(),
            alt_prefix: default_alt_prefix(),
            pointer_key: default_pointer_key(),
            expire_grace_secs: default_expire_grace(),
            key_batch_size: default_key_batch(),
            page_size: default_page_size(),
            min_term_length: default_min_term_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DictionaryConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    /// Overrides the bundled stop-word list when set.
    pub stop_words: Option<StopWordList>,
    #[serde(default = "default_excluded_sources")]
    pub excluded_mapping_sources: Vec<String>,
}

/// Stop words as a TOML array or one comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopWordList {
    List(Vec<String>),
    Csv(String),
}

fn default_excluded_sources() -> Vec<String> { vec!["LOOM".to_string()] }

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            stop_words: None,
            excluded_mapping_sources: default_excluded_sources(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderConfig {
    #[serde(default = "default_hierarchy_levels")]
    pub hierarchy_levels: u32,
}

fn default_hierarchy_levels() -> u32 { 5 }

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self { hierarchy_levels: default_hierarchy_levels() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphConfig {
    pub sparql_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorpusConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "0.0.0.0:3000".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Settings {
    /// Load configuration from ontoscan.toml.
    /// Checks ONTOSCAN_CONFIG env var first, then current directory.
    pub fn load() -> Result<Self> {
        let path = std::env::var("ONTOSCAN_CONFIG")
            .unwrap_or_else(|_| "ontoscan.toml".to_string());

        if !Path::new(&path).exists() {
            return Err(OntoscanError::Config(format!(
                "Config file not found: {path}\n\
                 Copy ontoscan.example.toml to ontoscan.toml and edit it."
            )));
        }

        tracing::info!(path = %path, "Loading configuration");
        Self::load_from(&path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)
            .map_err(|e| OntoscanError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let cache = &self.cache;
        if cache.prefix.is_empty() || cache.alt_prefix.is_empty() {
            return Err(OntoscanError::Config("cache instance prefixes must be non-empty".into()));
        }
        if cache.prefix == cache.alt_prefix {
            return Err(OntoscanError::Config(format!(
                "cache prefixes must differ (both are {:?})",
                cache.prefix
            )));
        }
        if cache.key_batch_size == 0 || cache.page_size == 0 {
            return Err(OntoscanError::Config("cache batch and page sizes must be > 0".into()));
        }
        if self.matcher.port == 0 || self.matcher.alt_port == 0 {
            return Err(OntoscanError::Config("span matcher ports must be non-zero".into()));
        }
        if self.matcher.kind == MatcherKind::Rest && self.matcher.rest_url.is_none() {
            return Err(OntoscanError::Config("matcher.kind = \"rest\" requires matcher.rest_url".into()));
        }
        Ok(())
    }

    /// Dictionary file path; exporting without one is a configuration error.
    pub fn require_dictionary_path(&self) -> Result<&Path> {
        self.dictionary
            .path
            .as_deref()
            .ok_or_else(|| OntoscanError::Config("dictionary.path is not configured".into()))
    }
}
