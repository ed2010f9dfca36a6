//! Request/response definitions for the service surface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chunk::RetrievedChunk;

/// Request to register an uploaded document and start ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestDocumentRequest {
    /// ID of the owning user
    pub owner_id: Uuid,

    /// Original filename as uploaded
    pub filename: String,

    /// Declared MIME type of the upload
    pub mime_type: String,

    /// Upload size in bytes
    pub size_bytes: u64,

    /// Path where the upload was stored
    pub storage_path: String,
}

/// Response when ingestion has been accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestDocumentResponse {
    /// ID of the created document
    pub document_id: Uuid,

    /// Whether ingestion was accepted
    pub accepted: bool,

    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A similarity search over one user's corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// ID of the querying user; scopes both the credential and the corpus
    pub user_id: Uuid,

    /// Query text to embed and match
    pub query: String,

    /// Number of results to return; the service default applies when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
}

/// Ranked results for a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching chunks in descending score order
    pub results: Vec<RetrievedChunk>,
}
