use thiserror::Error;

use relgraph_introspect::ProviderError;

/// Errors raised inside an analyzer before `run` converts them into an
/// empty dataset.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Graph(#[from] relgraph_core::Error),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("analyzer panicked: {0}")]
    Panicked(String),
}

/// Result type for analyzer operations.
pub type Result<T> = std::result::Result<T, AnalyzeError>;
