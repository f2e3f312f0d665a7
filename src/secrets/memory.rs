//! Map-backed secret store.
//!
//! Used by tests and by callers that already hold secret material in memory
//! (for example an embedding operator that has listed secrets itself).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::{Result, SecretsError};
use super::payload::SecretPayload;
use super::store::SecretStore;

/// In-memory [`SecretStore`] keyed by `(namespace, name)`.
///
/// # Example
///
/// ```rust,ignore
/// let store = InMemorySecretStore::new()
///     .with_secret("quay", "redis-creds", [("password", "changeme")]);
/// let payload = store.get("quay", "redis-creds").await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    secrets: RwLock<HashMap<(String, String), SecretPayload>>,
    lookups: AtomicUsize,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_secret<K, V, I>(self, namespace: &str, name: &str, entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.with_payload(SecretPayload::from_entries(namespace, name, entries))
    }

    /// Builder-style insert of a prepared payload.
    pub fn with_payload(mut self, payload: SecretPayload) -> Self {
        let key = (payload.namespace().to_string(), payload.name().to_string());
        self.secrets.get_mut().insert(key, payload);
        self
    }

    /// Insert or replace a secret.
    pub async fn insert(&self, payload: SecretPayload) {
        let key = (payload.namespace().to_string(), payload.name().to_string());
        self.secrets.write().await.insert(key, payload);
    }

    /// Remove a secret, returning whether it existed.
    pub async fn remove(&self, namespace: &str, name: &str) -> bool {
        self.secrets.write().await.remove(&(namespace.to_string(), name.to_string())).is_some()
    }

    /// Number of `get` calls served so far, hits and misses alike.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretPayload> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let secrets = self.secrets.read().await;
        secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| SecretsError::not_found(format!("{}/{}", namespace, name)))
    }

    fn store_type(&self) -> &'static str {
        "memory"
    }
}
