//! Per-tenant cache of constructed embedding provider clients.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::EmbeddingProvider;

/// Process-lifetime cache mapping tenant ids to authenticated provider
/// clients.
///
/// Exists to avoid repeated credential decryption and client construction
/// on every embedding call. Entries have no TTL; correctness depends on
/// callers invalidating a tenant's entry whenever that tenant's stored
/// credential changes. Concurrent populate races resolve last-writer-wins;
/// only fully constructed clients are ever inserted.
pub struct ClientCache {
    clients: RwLock<HashMap<Uuid, Arc<dyn EmbeddingProvider>>>,
}

impl ClientCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the cached client for a tenant.
    pub async fn get(&self, tenant_id: Uuid) -> Option<Arc<dyn EmbeddingProvider>> {
        let clients = self.clients.read().await;
        clients.get(&tenant_id).cloned()
    }

    /// Insert or replace the client for a tenant.
    pub async fn put(&self, tenant_id: Uuid, provider: Arc<dyn EmbeddingProvider>) {
        let mut clients = self.clients.write().await;
        clients.insert(tenant_id, provider);
    }

    /// Drop the cached client for a tenant. Returns whether an entry was
    /// removed.
    pub async fn invalidate(&self, tenant_id: Uuid) -> bool {
        let mut clients = self.clients.write().await;
        clients.remove(&tenant_id).is_some()
    }

    /// Number of cached clients.
    pub async fn len(&self) -> usize {
        let clients = self.clients.read().await;
        clients.len()
    }

    /// Check whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ClientCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetrievalError;
    use async_trait::async_trait;

    struct NullProvider;

    #[async_trait]
    impl EmbeddingProvider for NullProvider {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
            Ok(vec![Vec::new(); texts.len()])
        }
    }

    #[tokio::test]
    async fn put_get_invalidate_cycle() {
        let cache = ClientCache::new();
        let tenant = Uuid::new_v4();

        assert!(cache.get(tenant).await.is_none());
        assert!(!cache.invalidate(tenant).await);

        cache.put(tenant, Arc::new(NullProvider)).await;
        assert!(cache.get(tenant).await.is_some());
        assert_eq!(cache.len().await, 1);

        assert!(cache.invalidate(tenant).await);
        assert!(cache.get(tenant).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn entries_are_per_tenant() {
        let cache = ClientCache::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        cache.put(a, Arc::new(NullProvider)).await;
        assert!(cache.get(a).await.is_some());
        assert!(cache.get(b).await.is_none());

        cache.invalidate(a).await;
        assert!(cache.is_empty().await);
    }
}
