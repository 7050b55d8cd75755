//! Error types for RagBuddy
//!
//! One error enum for the whole retrieval pipeline. Recoverable conditions
//! (a bad document, a missing search backend, an empty corpus) never reach
//! this type; they are handled where they happen and logged.

use thiserror::Error;

/// Main error type for the retrieval pipeline
#[derive(Error, Debug)]
pub enum RagError {
    /// Chunker or pipeline configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Query language outside the supported set
    #[error("Unsupported language '{0}' (expected 'en' or 'ar')")]
    UnsupportedLanguage(String),

    /// Query asked for zero results
    #[error("top_k must be at least 1")]
    InvalidTopK,

    /// Embedding rows of differing width handed to the index
    #[error("Embedding dimension mismatch at row {row}: expected {expected}, got {actual}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// The generation backend could not produce an answer.
    ///
    /// Retrieval already happened when this is raised, so the citations and
    /// chunk texts it found are carried along for the caller.
    #[error("Generation backend '{backend}' failed: {message}")]
    Generation {
        backend: String,
        message: String,
        citations: Vec<String>,
        retrieved_chunks: Vec<String>,
    },

    /// Malformed chunk identifier
    #[error("Invalid chunk id: {0}")]
    InvalidChunkId(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RagError {
    /// Backend failure raised before retrieval results are attached
    pub fn generation(backend: impl Into<String>, message: impl Into<String>) -> Self {
        RagError::Generation {
            backend: backend.into(),
            message: message.into(),
            citations: Vec::new(),
            retrieved_chunks: Vec::new(),
        }
    }

    /// Attach what retrieval found to a generation failure
    pub fn with_retrieval(self, found_citations: Vec<String>, found_chunks: Vec<String>) -> Self {
        match self {
            RagError::Generation {
                backend, message, ..
            } => RagError::Generation {
                backend,
                message,
                citations: found_citations,
                retrieved_chunks: found_chunks,
            },
            other => other,
        }
    }

    /// True when retrieval succeeded but the backend could not answer
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, RagError::Generation { .. })
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RagError>;
