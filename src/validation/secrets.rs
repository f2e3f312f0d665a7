//! Secret existence and required-key checks.

use tracing::{debug, warn};

use crate::errors::{Error, Result};
use crate::secrets::{SecretPayload, SecretStore};

/// Keys a particular use of a secret needs.
///
/// The variant is chosen at the call site; the validator never guesses the
/// shape from the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredKeys {
    /// The secret only has to exist.
    Any,
    /// Key to human-readable label. Only the keys are required; labels end
    /// up in the error when one is missing.
    Named(Vec<(String, String)>),
    /// Ordered key list.
    List(Vec<String>),
}

impl RequiredKeys {
    pub fn named<K, L, I>(pairs: I) -> Self
    where
        K: Into<String>,
        L: Into<String>,
        I: IntoIterator<Item = (K, L)>,
    {
        RequiredKeys::Named(pairs.into_iter().map(|(k, l)| (k.into(), l.into())).collect())
    }

    pub fn list<K, I>(keys: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = K>,
    {
        RequiredKeys::List(keys.into_iter().map(Into::into).collect())
    }

    /// Required keys in check order.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            RequiredKeys::Any => Vec::new(),
            RequiredKeys::Named(pairs) => pairs.iter().map(|(k, _)| k.as_str()).collect(),
            RequiredKeys::List(keys) => keys.iter().map(String::as_str).collect(),
        }
    }

    fn label(&self, key: &str) -> Option<&str> {
        match self {
            RequiredKeys::Named(pairs) => {
                pairs.iter().find(|(k, _)| k == key).map(|(_, l)| l.as_str())
            }
            _ => None,
        }
    }
}

/// Resolves secrets through a [`SecretStore`] and checks their keys.
#[derive(Clone, Copy)]
pub struct SecretValidator<'a> {
    store: &'a dyn SecretStore,
}

impl<'a> SecretValidator<'a> {
    pub fn new(store: &'a dyn SecretStore) -> Self {
        Self { store }
    }

    /// Fetch `name` from `namespace` and confirm every required key is present.
    ///
    /// Returns the full payload, including keys outside the required set.
    pub async fn resolve(
        &self,
        namespace: &str,
        name: &str,
        required: &RequiredKeys,
    ) -> Result<SecretPayload> {
        if name.is_empty() {
            return Err(Error::validation("Secret name must not be empty"));
        }

        let payload = self.store.get(namespace, name).await.map_err(|e| {
            let error = Error::from_store(namespace, name, e);
            warn!(
                namespace = %namespace,
                secret = %name,
                store = self.store.store_type(),
                error = %error,
                "Secret lookup failed"
            );
            error
        })?;

        for key in required.keys() {
            if !payload.contains_key(key) {
                warn!(
                    namespace = %namespace,
                    secret = %name,
                    key = %key,
                    "Secret is missing a required key"
                );
                return Err(Error::MissingKey {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                    key: key.to_string(),
                    label: required.label(key).map(str::to_string),
                });
            }
        }

        debug!(
            namespace = %namespace,
            secret = %name,
            keys = payload.len(),
            required = required.keys().len(),
            "Resolved secret"
        );
        Ok(payload)
    }
}
