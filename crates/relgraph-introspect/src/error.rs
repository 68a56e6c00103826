use thiserror::Error;

/// Failures raised by schema and association providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Database error or adapter failure.
    #[error("database error: {0}")]
    Db(String),
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error("unknown model type: {0}")]
    UnknownModel(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Catch-all for provider-specific failures.
    #[error("provider error: {0}")]
    Other(String),
}

impl From<sqlx::Error> for ProviderError {
    fn from(value: sqlx::Error) -> Self {
        ProviderError::Db(value.to_string())
    }
}

/// Convenience alias for provider results.
pub type Result<T> = std::result::Result<T, ProviderError>;
