//! Error types for Juris.
//!
//! Every fallible operation in the crate returns [`Result`]. Failures that are
//! local to one retrieval branch (lexical or semantic) are recovered inside the
//! retriever by degrading the response; only validation errors and build
//! failures reach callers.

use std::time::Duration;

use thiserror::Error;

/// The error type for Juris operations.
#[derive(Error, Debug)]
pub enum JurisError {
    /// I/O failure (cache persistence, corpus files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller supplied an argument outside its valid range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration value cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Text analysis failed.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// The embedding service could not produce vectors.
    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The embedding service did not answer in time.
    #[error("Embedding service timed out after {0:?}")]
    EmbeddingTimeout(Duration),

    /// Building an index snapshot failed. The previous snapshot stays live.
    #[error("Index build failed: {0}")]
    IndexBuild(String),

    /// Internal invariant violation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JurisError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        JurisError::InvalidArgument(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        JurisError::InvalidConfig(msg.into())
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        JurisError::Analysis(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        JurisError::EmbeddingUnavailable(msg.into())
    }

    pub fn index_build(msg: impl Into<String>) -> Self {
        JurisError::IndexBuild(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        JurisError::Internal(msg.into())
    }

    /// Returns true if this error comes from the embedding service.
    ///
    /// These are the failures the retriever absorbs by falling back to
    /// lexical-only ranking.
    pub fn is_embedding_failure(&self) -> bool {
        matches!(
            self,
            JurisError::EmbeddingUnavailable(_) | JurisError::EmbeddingTimeout(_)
        )
    }
}

/// Result type alias for Juris operations.
pub type Result<T> = std::result::Result<T, JurisError>;
