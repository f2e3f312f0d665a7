//! Secret store capability consumed by the resolver.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::Result;
use super::payload::SecretPayload;

/// Read access to namespaced key-value secrets.
///
/// Implementations must report an absent secret as
/// [`SecretsError::NotFound`](super::SecretsError::NotFound) and every other
/// failure (unreachable store, denied access, undecodable object) with one of
/// the remaining variants, so callers can tell the two apart.
///
/// Implementations MUST NOT log secret values.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the full payload of `name` in `namespace`.
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretPayload>;

    /// Short identifier used in logs.
    fn store_type(&self) -> &'static str;
}

#[async_trait]
impl<T: SecretStore + ?Sized> SecretStore for Arc<T> {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretPayload> {
        (**self).get(namespace, name).await
    }

    fn store_type(&self) -> &'static str {
        (**self).store_type()
    }
}

#[async_trait]
impl<T: SecretStore + ?Sized> SecretStore for Box<T> {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretPayload> {
        (**self).get(namespace, name).await
    }

    fn store_type(&self) -> &'static str {
        (**self).store_type()
    }
}
