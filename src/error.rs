//! Error taxonomy for the retrieval engine.

use thiserror::Error;

/// Errors produced by the retrieval engine.
///
/// The variants separate failures the caller can act on (rotate a key,
/// retry with backoff, fix an input file) from integrity violations that
/// should never occur while ingestion invariants hold.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// No usable embedding credential for the tenant. Not retryable
    /// without user action.
    #[error("embedding credential unavailable: {0}")]
    Configuration(String),

    /// Transport or HTTP failure from the embedding provider. The caller
    /// may retry with backoff.
    #[error("embedding provider request failed: {0}")]
    Provider(String),

    /// The input file could not be turned into text. Surfaced as a
    /// `failed` document status.
    #[error("text extraction failed: {0}")]
    Extraction(String),

    /// Two vectors of different dimension were compared. Fatal to the
    /// query; indicates a corrupted corpus.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The stored credential blob is malformed or keyed for another
    /// installation. Reported to callers as a configuration problem.
    #[error("credential decryption failed: {0}")]
    Decryption(String),

    /// Persistence collaborator failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl RetrievalError {
    /// Collapse decryption failures into the configuration category the
    /// caller sees: both mean "this tenant has no usable credential".
    pub fn as_caller_facing(self) -> Self {
        match self {
            RetrievalError::Decryption(msg) => {
                RetrievalError::Configuration(format!("stored credential unusable: {msg}"))
            }
            other => other,
        }
    }

    /// Whether retrying the same call could succeed without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RetrievalError::Provider(_) | RetrievalError::Storage(_))
    }
}
