//! In-memory reference implementation of the document store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CorpusEntry, DocumentStore};
use crate::error::RetrievalError;
use crate::types::{Chunk, Document, DocumentStatus};

#[derive(Default)]
struct Tables {
    documents: HashMap<Uuid, Document>,
    chunks: HashMap<Uuid, Chunk>,
    // chunk ids per document, in sequence order
    document_chunks: HashMap<Uuid, Vec<Uuid>>,
    embeddings: HashMap<Uuid, Vec<f32>>,
}

/// In-memory document store.
///
/// A single lock over all tables makes every call atomic, which gives
/// `load_corpus` its consistent-snapshot guarantee for free.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_document(&self, document: &Document) -> Result<(), RetrievalError> {
        let mut tables = self.tables.write().await;
        tables.documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn get_document(&self, document_id: Uuid) -> Result<Option<Document>, RetrievalError> {
        let tables = self.tables.read().await;
        Ok(tables.documents.get(&document_id).cloned())
    }

    async fn update_status(
        &self,
        document_id: Uuid,
        status: DocumentStatus,
        error: Option<String>,
    ) -> Result<(), RetrievalError> {
        let mut tables = self.tables.write().await;
        let document = tables
            .documents
            .get_mut(&document_id)
            .ok_or_else(|| RetrievalError::Storage(format!("unknown document {document_id}")))?;
        document.status = status;
        document.error = error;
        document.updated_at = Utc::now();
        Ok(())
    }

    async fn save_chunks(
        &self,
        document_id: Uuid,
        chunks: &[Chunk],
    ) -> Result<(), RetrievalError> {
        let mut tables = self.tables.write().await;
        let ids: Vec<Uuid> = chunks.iter().map(|c| c.id).collect();
        for chunk in chunks {
            tables.chunks.insert(chunk.id, chunk.clone());
        }
        tables.document_chunks.insert(document_id, ids);
        Ok(())
    }

    async fn save_embeddings(
        &self,
        embeddings: &[(Uuid, Vec<f32>)],
    ) -> Result<(), RetrievalError> {
        let mut tables = self.tables.write().await;
        for (chunk_id, vector) in embeddings {
            if !tables.chunks.contains_key(chunk_id) {
                return Err(RetrievalError::Storage(format!(
                    "embedding references unknown chunk {chunk_id}"
                )));
            }
            tables.embeddings.insert(*chunk_id, vector.clone());
        }
        Ok(())
    }

    async fn clear_document_index(&self, document_id: Uuid) -> Result<(), RetrievalError> {
        let mut tables = self.tables.write().await;
        if let Some(chunk_ids) = tables.document_chunks.remove(&document_id) {
            for chunk_id in chunk_ids {
                tables.chunks.remove(&chunk_id);
                tables.embeddings.remove(&chunk_id);
            }
        }
        Ok(())
    }

    async fn load_corpus(&self, owner_id: Uuid) -> Result<Vec<CorpusEntry>, RetrievalError> {
        let tables = self.tables.read().await;
        let mut corpus = Vec::new();

        // deterministic corpus order: documents by creation time, chunks
        // in sequence order
        let mut documents: Vec<&Document> = tables
            .documents
            .values()
            .filter(|d| d.owner_id == owner_id && d.status == DocumentStatus::Completed)
            .collect();
        documents.sort_by_key(|d| (d.created_at, d.id));

        for document in documents {
            let Some(chunk_ids) = tables.document_chunks.get(&document.id) else {
                continue;
            };
            for chunk_id in chunk_ids {
                if let Some(vector) = tables.embeddings.get(chunk_id) {
                    corpus.push(CorpusEntry {
                        chunk_id: *chunk_id,
                        document_id: document.id,
                        vector: vector.clone(),
                    });
                }
            }
        }

        Ok(corpus)
    }

    async fn get_chunks(&self, chunk_ids: &[Uuid]) -> Result<Vec<Chunk>, RetrievalError> {
        let tables = self.tables.read().await;
        let mut chunks = Vec::with_capacity(chunk_ids.len());
        for chunk_id in chunk_ids {
            let chunk = tables.chunks.get(chunk_id).ok_or_else(|| {
                RetrievalError::Storage(format!("unknown chunk {chunk_id}"))
            })?;
            chunks.push(chunk.clone());
        }
        Ok(chunks)
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<bool, RetrievalError> {
        let existed = {
            let mut tables = self.tables.write().await;
            tables.documents.remove(&document_id).is_some()
        };
        // cascade to chunks and embeddings
        self.clear_document_index(document_id).await?;
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(owner: Uuid, status: DocumentStatus) -> Document {
        let mut doc = Document::new(
            owner,
            "doc.txt".to_string(),
            "text/plain".to_string(),
            10,
            "/uploads/doc.txt".to_string(),
        );
        doc.status = status;
        doc
    }

    async fn index_document(store: &MemoryStore, doc: &Document, vectors: usize) -> Vec<Uuid> {
        store.insert_document(doc).await.unwrap();
        let chunks: Vec<Chunk> = (0..vectors)
            .map(|i| Chunk::new(doc.id, i, format!("chunk {i}"), 2))
            .collect();
        store.save_chunks(doc.id, &chunks).await.unwrap();
        let embeddings: Vec<(Uuid, Vec<f32>)> = chunks
            .iter()
            .map(|c| (c.id, vec![c.chunk_index as f32, 1.0]))
            .collect();
        store.save_embeddings(&embeddings).await.unwrap();
        chunks.iter().map(|c| c.id).collect()
    }

    #[tokio::test]
    async fn corpus_contains_only_completed_documents() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();

        let completed = document(owner, DocumentStatus::Completed);
        let processing = document(owner, DocumentStatus::Processing);
        index_document(&store, &completed, 2).await;
        index_document(&store, &processing, 2).await;

        let corpus = store.load_corpus(owner).await.unwrap();
        assert_eq!(corpus.len(), 2);
        assert!(corpus.iter().all(|e| e.document_id == completed.id));
    }

    #[tokio::test]
    async fn corpus_is_tenant_scoped() {
        let store = MemoryStore::new();
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();

        let doc_a = document(tenant_a, DocumentStatus::Completed);
        let doc_b = document(tenant_b, DocumentStatus::Completed);
        index_document(&store, &doc_a, 3).await;
        index_document(&store, &doc_b, 5).await;

        let corpus = store.load_corpus(tenant_a).await.unwrap();
        assert_eq!(corpus.len(), 3);
        assert!(corpus.iter().all(|e| e.document_id == doc_a.id));
    }

    #[tokio::test]
    async fn clear_document_index_removes_all_rows() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let doc = document(owner, DocumentStatus::Completed);
        let chunk_ids = index_document(&store, &doc, 3).await;

        store.clear_document_index(doc.id).await.unwrap();

        assert!(store.load_corpus(owner).await.unwrap().is_empty());
        assert!(store.get_chunks(&chunk_ids).await.is_err());
        // the document record itself survives
        assert!(store.get_document(doc.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_document_cascades() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let doc = document(owner, DocumentStatus::Completed);
        let chunk_ids = index_document(&store, &doc, 2).await;

        assert!(store.delete_document(doc.id).await.unwrap());
        assert!(store.get_document(doc.id).await.unwrap().is_none());
        assert!(store.get_chunks(&chunk_ids).await.is_err());
        assert!(store.load_corpus(owner).await.unwrap().is_empty());
        // deleting again reports absence
        assert!(!store.delete_document(doc.id).await.unwrap());
    }

    #[tokio::test]
    async fn update_status_rejects_unknown_document() {
        let store = MemoryStore::new();
        let err = store
            .update_status(Uuid::new_v4(), DocumentStatus::Processing, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Storage(_)));
    }

    #[tokio::test]
    async fn get_chunks_preserves_requested_order() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let doc = document(owner, DocumentStatus::Completed);
        let chunk_ids = index_document(&store, &doc, 3).await;

        let reversed: Vec<Uuid> = chunk_ids.iter().rev().copied().collect();
        let chunks = store.get_chunks(&reversed).await.unwrap();
        let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![2, 1, 0]);
    }
}
