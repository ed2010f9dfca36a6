//! Embedding generation with per-tenant provider clients.

mod cache;
mod provider;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::credentials::CredentialStore;
use crate::error::RetrievalError;
use crate::EMBEDDING_BATCH_SIZE;

pub use cache::ClientCache;
pub use provider::{HttpEmbeddingProvider, HttpProviderFactory};

/// A constructed, authenticated embedding backend.
///
/// One call maps a batch of texts to one vector per text, order-preserved.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError>;
}

/// Builds a provider from a decrypted API key.
///
/// Injected so the construction step is swappable in tests and the client
/// never touches plaintext key handling beyond this call.
pub trait ProviderFactory: Send + Sync {
    fn build(&self, api_key: &str) -> Result<Arc<dyn EmbeddingProvider>, RetrievalError>;
}

/// Embedding client with per-tenant provider resolution and batching.
///
/// Tenant calls resolve the tenant's decrypted credential into a provider
/// client, cached across calls until [`EmbeddingClient::invalidate`] drops
/// it on key rotation. Calls without a tenant use the process-wide default
/// credential and are meant for internal/background work only.
pub struct EmbeddingClient {
    cache: Arc<ClientCache>,
    credentials: Arc<dyn CredentialStore>,
    factory: Arc<dyn ProviderFactory>,
    default_provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl EmbeddingClient {
    /// Create a client over the given collaborators.
    ///
    /// `default_api_key` configures the no-tenant fallback provider; when
    /// absent, calls without a tenant fail with a configuration error.
    pub fn new(
        cache: Arc<ClientCache>,
        credentials: Arc<dyn CredentialStore>,
        factory: Arc<dyn ProviderFactory>,
        default_api_key: Option<&str>,
    ) -> Result<Self, RetrievalError> {
        let default_provider = match default_api_key {
            Some(key) => Some(factory.build(key)?),
            None => None,
        };
        Ok(Self {
            cache,
            credentials,
            factory,
            default_provider,
        })
    }

    /// Embed a batch of texts, one vector per input, in input order.
    ///
    /// Inputs are split into provider calls of at most
    /// [`EMBEDDING_BATCH_SIZE`] texts, issued sequentially. The first
    /// failing call fails the whole batch; completed partial results are
    /// discarded rather than returned.
    pub async fn embed_batch(
        &self,
        texts: &[String],
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<Vec<f32>>, RetrievalError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let provider = self.resolve_provider(tenant_id).await?;

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBEDDING_BATCH_SIZE) {
            let mut batch_vectors = provider.embed(batch).await?;
            vectors.append(&mut batch_vectors);
        }

        debug!(
            inputs = texts.len(),
            vectors = vectors.len(),
            "embedded batch"
        );
        Ok(vectors)
    }

    /// Embed a single query text.
    ///
    /// A provider that returns no data yields an empty vector rather than
    /// an error.
    pub async fn embed_query(
        &self,
        text: &str,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<f32>, RetrievalError> {
        let mut vectors = self
            .embed_batch(std::slice::from_ref(&text.to_string()), tenant_id)
            .await?;
        if vectors.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vectors.swap_remove(0))
    }

    /// Drop the cached provider for a tenant.
    ///
    /// Called by the credential-update path whenever a tenant rotates
    /// their key; the next call re-resolves from the credential store.
    pub async fn invalidate(&self, tenant_id: Uuid) -> bool {
        let dropped = self.cache.invalidate(tenant_id).await;
        if dropped {
            info!(tenant_id = %tenant_id, "invalidated cached embedding client");
        }
        dropped
    }

    async fn resolve_provider(
        &self,
        tenant_id: Option<Uuid>,
    ) -> Result<Arc<dyn EmbeddingProvider>, RetrievalError> {
        let Some(tenant_id) = tenant_id else {
            return self.default_provider.clone().ok_or_else(|| {
                RetrievalError::Configuration(
                    "no default embedding credential configured".to_string(),
                )
            });
        };

        if let Some(provider) = self.cache.get(tenant_id).await {
            return Ok(provider);
        }

        let credential = self
            .credentials
            .embedding_credential(tenant_id)
            .await?
            .ok_or_else(|| {
                RetrievalError::Configuration(format!(
                    "no embedding credential configured for tenant {tenant_id}"
                ))
            })?;
        let api_key = self
            .credentials
            .decrypt(&credential)
            .map_err(RetrievalError::as_caller_facing)?;

        let provider = self.factory.build(&api_key)?;
        // Losing a concurrent construction race is fine: last writer wins,
        // and either entry is a fully initialized client.
        self.cache.put(tenant_id, Arc::clone(&provider)).await;

        debug!(tenant_id = %tenant_id, "constructed embedding client");
        Ok(provider)
    }
}
