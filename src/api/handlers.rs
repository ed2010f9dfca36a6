//! HTTP request handlers for the retrieval service.
//!
//! The HTTP layer is a thin caller: it registers uploads, spawns
//! ingestion, and forwards queries to the pipeline. All retrieval
//! semantics live below it.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::credentials::{EncryptedCredential, StaticCredentialStore};
use crate::embeddings::EmbeddingClient;
use crate::error::RetrievalError;
use crate::pipeline::RetrievalPipeline;
use crate::storage::DocumentStore;
use crate::types::{
    Document, IngestDocumentRequest, IngestDocumentResponse, RetrievalConfig, SearchRequest,
    SearchResponse,
};

/// Application state shared across handlers.
pub struct AppState {
    pub pipeline: Arc<RetrievalPipeline>,
    pub store: Arc<dyn DocumentStore>,
    pub embeddings: Arc<EmbeddingClient>,
    pub credentials: Arc<StaticCredentialStore>,
    pub config: RetrievalConfig,
}

fn status_for(error: &RetrievalError) -> StatusCode {
    match error {
        RetrievalError::Configuration(_) | RetrievalError::Decryption(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RetrievalError::Provider(_) => StatusCode::BAD_GATEWAY,
        RetrievalError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RetrievalError::DimensionMismatch { .. } | RetrievalError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Register an uploaded document and start ingestion in the background.
pub async fn ingest_document(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IngestDocumentRequest>,
) -> Result<Json<IngestDocumentResponse>, StatusCode> {
    let document = Document::new(
        request.owner_id,
        request.filename,
        request.mime_type,
        request.size_bytes,
        request.storage_path,
    );
    let document_id = document.id;

    state
        .store
        .insert_document(&document)
        .await
        .map_err(|e| status_for(&e))?;

    info!(
        document_id = %document_id,
        owner_id = %request.owner_id,
        "accepted document for ingestion"
    );

    let pipeline = Arc::clone(&state.pipeline);
    tokio::spawn(async move {
        // the pipeline records the terminal status; the error here is
        // already reflected on the document
        if let Err(e) = pipeline.ingest_document(document_id).await {
            warn!(document_id = %document_id, error = %e, "background ingestion failed");
        }
    });

    Ok(Json(IngestDocumentResponse {
        document_id,
        accepted: true,
        message: None,
    }))
}

/// Fetch a document record with its ingestion status.
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let document = state
        .store
        .get_document(document_id)
        .await
        .map_err(|e| status_for(&e))?;

    match document {
        Some(document) => Ok(Json(document)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Delete a document, cascading to its chunks and embeddings.
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let existed = state
        .store
        .delete_document(document_id)
        .await
        .map_err(|e| status_for(&e))?;

    if existed {
        info!(document_id = %document_id, "deleted document");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// Run a similarity search over the requesting user's corpus.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, StatusCode> {
    let k = request.k.unwrap_or(state.config.default_top_k);
    let results = state
        .pipeline
        .query(request.user_id, &request.query, k)
        .await
        .map_err(|e| status_for(&e))?;

    Ok(Json(SearchResponse { results }))
}

/// Request body for storing a tenant's embedding credential.
#[derive(Debug, Deserialize)]
pub struct SetCredentialRequest {
    pub api_key: String,
}

/// Response for credential operations.
#[derive(Debug, Serialize)]
pub struct CredentialResponse {
    pub tenant_id: Uuid,
    pub cache_invalidated: bool,
}

/// Store (or rotate) a tenant's embedding credential.
///
/// Rotation drops the tenant's cached client so the next embedding call
/// authenticates with the new key.
pub async fn set_credential(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<SetCredentialRequest>,
) -> Result<Json<CredentialResponse>, StatusCode> {
    if request.api_key.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    state
        .credentials
        .set_credential(
            tenant_id,
            EncryptedCredential::new(request.api_key.into_bytes()),
        )
        .await;
    let cache_invalidated = state.embeddings.invalidate(tenant_id).await;

    info!(tenant_id = %tenant_id, "stored embedding credential");
    Ok(Json(CredentialResponse {
        tenant_id,
        cache_invalidated,
    }))
}

/// Drop a tenant's cached embedding client without changing the stored
/// credential.
pub async fn invalidate_credential_cache(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<Uuid>,
) -> Json<CredentialResponse> {
    let cache_invalidated = state.embeddings.invalidate(tenant_id).await;
    Json(CredentialResponse {
        tenant_id,
        cache_invalidated,
    })
}
