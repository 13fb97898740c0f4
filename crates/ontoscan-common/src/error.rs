use thiserror::Error;

#[derive(Debug, Error)]
pub enum OntoscanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Span matcher unavailable: {0}")]
    MatcherUnavailable(String),

    #[error("Span matcher protocol error: {0}")]
    Protocol(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Cache store error: {0}")]
    Cache(String),

    #[error("Graph query error: {0}")]
    Graph(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OntoscanError {
    /// True for failures caused by an unreachable or misbehaving upstream
    /// (span matcher, graph endpoint, cache backend).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            OntoscanError::MatcherUnavailable(_)
                | OntoscanError::Protocol(_)
                | OntoscanError::Timeout(_)
                | OntoscanError::Cache(_)
                | OntoscanError::Graph(_)
                | OntoscanError::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, OntoscanError>;
