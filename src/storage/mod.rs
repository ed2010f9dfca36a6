//! Persistence seam for documents, chunks, and embeddings.

mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RetrievalError;
use crate::types::{Chunk, Document, DocumentStatus};

pub use memory::MemoryStore;

/// One row of a tenant's searchable corpus.
#[derive(Debug, Clone)]
pub struct CorpusEntry {
    /// ID of the embedded chunk
    pub chunk_id: Uuid,

    /// ID of the chunk's parent document
    pub document_id: Uuid,

    /// The stored embedding vector
    pub vector: Vec<f32>,
}

/// Durable storage for the retrieval engine.
///
/// The vector representation on disk is the implementation's concern; the
/// engine only requires storing and retrieving a fixed-length ordered
/// sequence of floats per chunk id. All operations touching one
/// document's rows must be usable within a single unit of work so
/// ingestion stays atomic at the document level.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a freshly uploaded document record.
    async fn insert_document(&self, document: &Document) -> Result<(), RetrievalError>;

    /// Fetch a document by id.
    async fn get_document(&self, document_id: Uuid) -> Result<Option<Document>, RetrievalError>;

    /// Transition a document's status; `error` accompanies `Failed`.
    async fn update_status(
        &self,
        document_id: Uuid,
        status: DocumentStatus,
        error: Option<String>,
    ) -> Result<(), RetrievalError>;

    /// Persist a document's chunks in sequence order.
    async fn save_chunks(
        &self,
        document_id: Uuid,
        chunks: &[Chunk],
    ) -> Result<(), RetrievalError>;

    /// Persist embedding vectors keyed by chunk id.
    async fn save_embeddings(
        &self,
        embeddings: &[(Uuid, Vec<f32>)],
    ) -> Result<(), RetrievalError>;

    /// Remove any chunks and embeddings stored for a document. Used to
    /// clean up after a failed ingestion so no partial rows survive.
    async fn clear_document_index(&self, document_id: Uuid) -> Result<(), RetrievalError>;

    /// Load the searchable corpus for one tenant: every embedded chunk of
    /// that tenant's `Completed` documents, as a consistent snapshot.
    /// Documents mid-ingestion contribute nothing.
    async fn load_corpus(&self, owner_id: Uuid) -> Result<Vec<CorpusEntry>, RetrievalError>;

    /// Fetch chunk records by id, in the order requested.
    async fn get_chunks(&self, chunk_ids: &[Uuid]) -> Result<Vec<Chunk>, RetrievalError>;

    /// Delete a document, cascading to its chunks and embeddings.
    async fn delete_document(&self, document_id: Uuid) -> Result<bool, RetrievalError>;
}
