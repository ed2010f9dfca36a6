//! Chunk type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ordered segment of a document's extracted text.
///
/// Chunks are the unit of embedding and retrieval. The sequence index
/// preserves original document order for citation and context assembly.
/// A chunk is immutable once created and lives only as long as its
/// parent document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier for this chunk
    pub id: Uuid,

    /// ID of the document this chunk was extracted from
    pub document_id: Uuid,

    /// Order of this chunk within its document (0-indexed, contiguous)
    pub chunk_index: usize,

    /// The actual text content of the chunk
    pub content: String,

    /// Estimated number of tokens in this chunk
    pub token_count: usize,

    /// When this chunk was created
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    /// Create a new chunk with the given parameters.
    pub fn new(document_id: Uuid, chunk_index: usize, content: String, token_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            chunk_index,
            content,
            token_count,
            created_at: Utc::now(),
        }
    }

    /// Get the length of the chunk content in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A chunk returned from a similarity query, with its score and parent
/// document reference, in rank order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// ID of the matching chunk
    pub chunk_id: Uuid,

    /// ID of the chunk's parent document
    pub document_id: Uuid,

    /// Position of the chunk within its document
    pub chunk_index: usize,

    /// The chunk text used to ground the chat response
    pub content: String,

    /// Cosine similarity against the query vector
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_construction() {
        let doc_id = Uuid::new_v4();
        let chunk = Chunk::new(doc_id, 3, "some text".to_string(), 3);
        assert_eq!(chunk.document_id, doc_id);
        assert_eq!(chunk.chunk_index, 3);
        assert_eq!(chunk.len(), 9);
        assert!(!chunk.is_empty());
    }
}
