use thiserror::Error;

/// Construction errors raised by the graph model.
#[derive(Debug, Error)]
pub enum Error {
    /// A required string field is empty or whitespace.
    #[error("{kind} {field} cannot be blank")]
    BlankField {
        kind: &'static str,
        field: &'static str,
    },
    /// A relationship points at its own source without the self-reference flag.
    #[error("relationship on {id} is self-referential but not flagged as such")]
    SelfReference { id: String },
    /// A cardinality string outside the known set.
    #[error("invalid cardinality: {0}")]
    InvalidCardinality(String),
    /// The plain representation cannot be mapped back onto the model.
    #[error("invalid plain representation: {0}")]
    InvalidPlain(String),
    /// The dataset as a whole violates graph invariants.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by the graph model.
pub type Result<T> = std::result::Result<T, Error>;
