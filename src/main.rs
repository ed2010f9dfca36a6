//! Retrieval Service - Main Entry Point
//!
//! Document retrieval engine for RAG-grounded chat.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use retrieval::api::handlers::{self, AppState};
use retrieval::chunking::SplitterConfig;
use retrieval::credentials::{CredentialStore, StaticCredentialStore};
use retrieval::embeddings::{ClientCache, EmbeddingClient, HttpProviderFactory, ProviderFactory};
use retrieval::extract::PlainTextExtractor;
use retrieval::pipeline::RetrievalPipeline;
use retrieval::storage::{DocumentStore, MemoryStore};
use retrieval::types::RetrievalConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "retrieval=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = RetrievalConfig::from_env();

    info!("Starting Retrieval Service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Chunk sizes: {}..{} chars, overlap {}",
        config.min_chunk_size, config.max_chunk_size, config.chunk_overlap
    );
    info!(
        "Embedding model: {} ({} dimensions)",
        config.embedding_model, config.embedding_dimension
    );

    // Initialize components
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let credentials = Arc::new(StaticCredentialStore::new());
    let factory = Arc::new(HttpProviderFactory::new(
        &config.embedding_base_url,
        &config.embedding_model,
        Duration::from_secs(config.request_timeout_secs),
    ));
    let embeddings = Arc::new(EmbeddingClient::new(
        Arc::new(ClientCache::new()),
        Arc::clone(&credentials) as Arc<dyn CredentialStore>,
        factory as Arc<dyn ProviderFactory>,
        config.default_api_key.as_deref(),
    )?);
    let splitter = SplitterConfig::new(
        config.min_chunk_size,
        config.max_chunk_size,
        config.chunk_overlap,
    );
    let pipeline = Arc::new(RetrievalPipeline::new(
        Arc::clone(&store),
        Arc::new(PlainTextExtractor::new()),
        Arc::clone(&embeddings),
        splitter,
    ));

    let state = Arc::new(AppState {
        pipeline,
        store,
        embeddings,
        credentials,
        config,
    });

    // Build HTTP routes
    let app = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Documents
        .route("/documents", post(handlers::ingest_document))
        .route("/documents/:document_id", get(handlers::get_document))
        .route("/documents/:document_id", delete(handlers::delete_document))
        // Retrieval
        .route("/search", post(handlers::search))
        // Tenant credentials
        .route("/tenants/:tenant_id/credentials", put(handlers::set_credential))
        .route(
            "/tenants/:tenant_id/credentials/invalidate",
            post(handlers::invalidate_credential_cache),
        )
        // State
        .with_state(state)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3019);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
