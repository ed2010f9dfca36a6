//! Retrieval orchestrator: ingestion and query pipelines.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::chunking::{split_text, SplitterConfig};
use crate::embeddings::EmbeddingClient;
use crate::error::RetrievalError;
use crate::extract::TextExtractor;
use crate::similarity::top_k;
use crate::storage::DocumentStore;
use crate::types::{Chunk, Document, DocumentStatus, RetrievedChunk};

/// Composes extraction, chunking, embedding, and persistence into the
/// document ingestion and similarity query operations.
pub struct RetrievalPipeline {
    store: Arc<dyn DocumentStore>,
    extractor: Arc<dyn TextExtractor>,
    embeddings: Arc<EmbeddingClient>,
    splitter: SplitterConfig,
}

impl RetrievalPipeline {
    /// Create a pipeline over the given collaborators.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        extractor: Arc<dyn TextExtractor>,
        embeddings: Arc<EmbeddingClient>,
        splitter: SplitterConfig,
    ) -> Self {
        Self {
            store,
            extractor,
            embeddings,
            splitter,
        }
    }

    /// Ingest one document: extract, chunk, embed, persist.
    ///
    /// The document ends in `Completed` with every chunk embedded, or in
    /// `Failed` with the error message and no persisted rows — never in
    /// `Processing`, and never partially indexed. Returns the number of
    /// chunks indexed.
    pub async fn ingest_document(&self, document_id: Uuid) -> Result<usize, RetrievalError> {
        let document = self
            .store
            .get_document(document_id)
            .await?
            .ok_or_else(|| RetrievalError::Storage(format!("unknown document {document_id}")))?;

        if !document.status.can_transition_to(DocumentStatus::Processing) {
            return Err(RetrievalError::Storage(format!(
                "document {document_id} is {} and cannot be ingested",
                document.status
            )));
        }

        self.store
            .update_status(document_id, DocumentStatus::Processing, None)
            .await?;

        info!(
            document_id = %document_id,
            owner_id = %document.owner_id,
            filename = %document.filename,
            "starting ingestion"
        );

        match self.run_ingestion(&document).await {
            Ok(chunk_count) => {
                self.store
                    .update_status(document_id, DocumentStatus::Completed, None)
                    .await?;
                info!(document_id = %document_id, chunks = chunk_count, "ingestion complete");
                Ok(chunk_count)
            }
            Err(e) => {
                let e = e.as_caller_facing();
                error!(document_id = %document_id, error = %e, "ingestion failed");
                // drop any rows written before the failure, then record it
                if let Err(cleanup) = self.store.clear_document_index(document_id).await {
                    warn!(document_id = %document_id, error = %cleanup, "cleanup after failure incomplete");
                }
                self.store
                    .update_status(document_id, DocumentStatus::Failed, Some(e.to_string()))
                    .await?;
                Err(e)
            }
        }
    }

    async fn run_ingestion(&self, document: &Document) -> Result<usize, RetrievalError> {
        let text = self
            .extractor
            .extract_text(Path::new(&document.storage_path))
            .await?;

        let segments = split_text(&text, &self.splitter);
        if segments.is_empty() {
            return Err(RetrievalError::Extraction(format!(
                "{} yielded no usable text to index",
                document.filename
            )));
        }

        let texts: Vec<String> = segments.iter().map(|s| s.content.clone()).collect();
        let vectors = self
            .embeddings
            .embed_batch(&texts, Some(document.owner_id))
            .await?;

        if vectors.len() != segments.len() {
            return Err(RetrievalError::Provider(format!(
                "provider returned {} vectors for {} chunks",
                vectors.len(),
                segments.len()
            )));
        }
        if let Some(first) = vectors.first() {
            for vector in &vectors {
                if vector.len() != first.len() {
                    return Err(RetrievalError::DimensionMismatch {
                        expected: first.len(),
                        actual: vector.len(),
                    });
                }
            }
        }

        let chunks: Vec<Chunk> = segments
            .into_iter()
            .map(|s| Chunk::new(document.id, s.index, s.content, s.token_count))
            .collect();
        let embeddings: Vec<(Uuid, Vec<f32>)> = chunks
            .iter()
            .map(|c| c.id)
            .zip(vectors)
            .collect();

        self.store.save_chunks(document.id, &chunks).await?;
        self.store.save_embeddings(&embeddings).await?;

        Ok(chunks.len())
    }

    /// Answer a similarity query over one user's corpus.
    ///
    /// Only chunks from documents the querying user owns are eligible;
    /// the tenant filter lives in the corpus load, not in scoring.
    /// Results arrive in descending score order.
    pub async fn query(
        &self,
        user_id: Uuid,
        query_text: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        let query_vector = self
            .embeddings
            .embed_query(query_text, Some(user_id))
            .await
            .map_err(RetrievalError::as_caller_facing)?;
        if query_vector.is_empty() {
            warn!(user_id = %user_id, "provider returned no query vector");
            return Ok(Vec::new());
        }

        let corpus = self.store.load_corpus(user_id).await?;
        if corpus.is_empty() {
            return Ok(Vec::new());
        }

        let pairs: Vec<(Uuid, Vec<f32>)> = corpus
            .iter()
            .map(|e| (e.chunk_id, e.vector.clone()))
            .collect();
        let ranked = top_k(&query_vector, &pairs, k)?;

        let ranked_ids: Vec<Uuid> = ranked.iter().map(|s| s.id).collect();
        let chunks = self.store.get_chunks(&ranked_ids).await?;

        let results = ranked
            .into_iter()
            .zip(chunks)
            .map(|(scored, chunk)| RetrievedChunk {
                chunk_id: chunk.id,
                document_id: chunk.document_id,
                chunk_index: chunk.chunk_index,
                content: chunk.content,
                score: scored.score,
            })
            .collect();

        Ok(results)
    }
}
