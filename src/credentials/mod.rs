//! Credential collaborator seam for per-tenant embedding keys.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::RetrievalError;

/// An encrypted credential blob as handed over by the credential store.
///
/// The engine never inspects the ciphertext; it only passes the blob back
/// to the store's decryption primitive.
#[derive(Debug, Clone)]
pub struct EncryptedCredential {
    pub blob: Vec<u8>,
}

impl EncryptedCredential {
    pub fn new(blob: Vec<u8>) -> Self {
        Self { blob }
    }
}

/// Access to tenant embedding credentials.
///
/// Implementations own both storage and the decryption primitive, so key
/// material and cipher stay in one place. Production deployments back
/// this with their KMS or settings table; [`StaticCredentialStore`] is
/// the in-process reference implementation.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the encrypted embedding credential for a tenant, or `None`
    /// if the tenant has not configured one.
    async fn embedding_credential(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<EncryptedCredential>, RetrievalError>;

    /// Decrypt a credential blob into the plaintext API key.
    ///
    /// Fails with [`RetrievalError::Decryption`] on malformed or
    /// foreign-keyed input.
    fn decrypt(&self, credential: &EncryptedCredential) -> Result<String, RetrievalError>;
}

/// In-memory credential store keyed by tenant id.
pub struct StaticCredentialStore {
    credentials: RwLock<HashMap<Uuid, EncryptedCredential>>,
}

impl StaticCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            credentials: RwLock::new(HashMap::new()),
        }
    }

    /// Store a credential blob for a tenant, replacing any previous one.
    pub async fn set_credential(&self, tenant_id: Uuid, credential: EncryptedCredential) {
        let mut credentials = self.credentials.write().await;
        credentials.insert(tenant_id, credential);
    }

    /// Remove a tenant's credential.
    pub async fn remove_credential(&self, tenant_id: Uuid) -> bool {
        let mut credentials = self.credentials.write().await;
        credentials.remove(&tenant_id).is_some()
    }
}

impl Default for StaticCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn embedding_credential(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<EncryptedCredential>, RetrievalError> {
        let credentials = self.credentials.read().await;
        Ok(credentials.get(&tenant_id).cloned())
    }

    fn decrypt(&self, credential: &EncryptedCredential) -> Result<String, RetrievalError> {
        let key = String::from_utf8(credential.blob.clone())
            .map_err(|e| RetrievalError::Decryption(e.to_string()))?;
        if key.trim().is_empty() {
            return Err(RetrievalError::Decryption(
                "credential decrypted to an empty key".to_string(),
            ));
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_a_stored_credential() {
        let store = StaticCredentialStore::new();
        let tenant = Uuid::new_v4();
        store
            .set_credential(tenant, EncryptedCredential::new(b"sk-test-123".to_vec()))
            .await;

        let blob = store
            .embedding_credential(tenant)
            .await
            .unwrap()
            .expect("credential should be present");
        assert_eq!(store.decrypt(&blob).unwrap(), "sk-test-123");
    }

    #[tokio::test]
    async fn missing_tenant_yields_none() {
        let store = StaticCredentialStore::new();
        assert!(store
            .embedding_credential(Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn malformed_blob_fails_decryption() {
        let store = StaticCredentialStore::new();
        let bad = EncryptedCredential::new(vec![0xff, 0xfe, 0x00]);
        assert!(matches!(
            store.decrypt(&bad),
            Err(RetrievalError::Decryption(_))
        ));

        let empty = EncryptedCredential::new(b"   ".to_vec());
        assert!(matches!(
            store.decrypt(&empty),
            Err(RetrievalError::Decryption(_))
        ));
    }
}
