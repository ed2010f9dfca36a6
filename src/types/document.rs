//! Document type and ingestion lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an uploaded document.
///
/// `Completed` and `Failed` are terminal; nothing leaves them except
/// deletion of the document itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Bytes are still being received
    Uploading,
    /// The ingestion pipeline is running
    Processing,
    /// Every chunk has a persisted embedding
    Completed,
    /// Ingestion failed; the document carries an error message
    Failed,
}

impl DocumentStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Completed | DocumentStatus::Failed)
    }

    /// Whether `next` is a legal transition from this status.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        match (self, next) {
            (DocumentStatus::Uploading, DocumentStatus::Processing) => true,
            (DocumentStatus::Processing, DocumentStatus::Completed) => true,
            (DocumentStatus::Processing, DocumentStatus::Failed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStatus::Uploading => write!(f, "uploading"),
            DocumentStatus::Processing => write!(f, "processing"),
            DocumentStatus::Completed => write!(f, "completed"),
            DocumentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// An uploaded file owned by exactly one user.
///
/// Created on upload, mutated only by the ingestion pipeline's status
/// transitions. Deleting a document cascades to its chunks and embeddings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier for this document
    pub id: Uuid,

    /// ID of the owning user; scopes credentials and retrieval
    pub owner_id: Uuid,

    /// Original filename as uploaded
    pub filename: String,

    /// Declared MIME type of the upload
    pub mime_type: String,

    /// Upload size in bytes
    pub size_bytes: u64,

    /// Current lifecycle status
    pub status: DocumentStatus,

    /// Error message; non-null exactly when status is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Path of the stored upload, handed to the text extractor
    pub storage_path: String,

    /// When the document record was created
    pub created_at: DateTime<Utc>,

    /// When the document record last changed
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a freshly uploaded document record.
    pub fn new(
        owner_id: Uuid,
        filename: String,
        mime_type: String,
        size_bytes: u64,
        storage_path: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            filename,
            mime_type,
            size_bytes,
            status: DocumentStatus::Uploading,
            error: None,
            storage_path,
            created_at: now,
            updated_at: now,
        }
    }
}
