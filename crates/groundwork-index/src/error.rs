//! Error types for groundwork-index.

use thiserror::Error;

/// Result type for groundwork-index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while storing, splitting, indexing or persisting documents.
#[derive(Error, Debug)]
pub enum Error {
    /// One or more identifiers in a batch already exist in the document store.
    #[error("Identifiers already exist in the document store: {}", .0.join(", "))]
    DuplicateId(Vec<String>),

    /// Identifier is not present in the document store.
    #[error("Document '{0}' not found")]
    NotFound(String),

    /// Embedding dimensionality differs from the one fixed by the index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality fixed by the first embedding.
        expected: usize,
        /// Dimensionality of the offending vector.
        actual: usize,
    },

    /// Number of embeddings differs from the number of chunks.
    #[error("Batch size mismatch: {documents} documents but {embeddings} embeddings")]
    BatchSizeMismatch {
        /// Number of chunks in the batch.
        documents: usize,
        /// Number of embeddings in the batch.
        embeddings: usize,
    },

    /// A saved index is missing an artifact or its artifacts disagree.
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// Backend identifier not recognised.
    #[error("Unsupported backend '{0}'")]
    UnsupportedBackend(String),

    /// Splitter language hint not recognised.
    #[error("Unsupported language type '{0}'")]
    UnsupportedLanguage(String),

    /// Invalid vector (e.g., empty, contains NaN).
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Configuration error.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The embedder collaborator failed.
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error came from the embedder rather than from index state.
    pub fn is_embedding_failure(&self) -> bool {
        matches!(self, Error::Embedding(_))
    }
}
