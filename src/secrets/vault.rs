//! HashiCorp Vault KV v2 secret store.
//!
//! A secret `<namespace>/<name>` is read from the KV v2 path
//! `<namespace>/<name>` under the configured mount. Every field of the stored
//! object becomes a payload key: string fields are taken as UTF-8 bytes, any
//! other JSON value is stored as its compact JSON text.
//!
//! # Example
//!
//! ```rust,ignore
//! use ecosystem_config::secrets::{VaultSecretStore, VaultStoreConfig};
//!
//! let store = VaultSecretStore::new(VaultStoreConfig {
//!     address: "https://vault.example.com".to_string(),
//!     token: Some("vault-token".into()),
//!     namespace: None,
//!     mount_path: "secret".to_string(),
//! })?;
//! let payload = store.get("quay-enterprise", "redis-creds").await?;
//! ```
//!
//! Tokens are never logged.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;
use vaultrs::kv2;

use super::error::{Result, SecretsError};
use super::payload::SecretPayload;
use super::store::SecretStore;
use super::types::SecretString;

/// Connection settings for [`VaultSecretStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultStoreConfig {
    /// Vault server address (e.g., "https://vault.example.com:8200")
    pub address: String,

    /// Authentication token
    pub token: Option<SecretString>,

    /// Optional Vault Enterprise namespace
    pub namespace: Option<String>,

    /// KV v2 mount path (default: "secret")
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
}

fn default_mount_path() -> String {
    "secret".to_string()
}

/// [`SecretStore`] reading from Vault's KV v2 engine.
pub struct VaultSecretStore {
    client: VaultClient,
    mount_path: String,
}

impl std::fmt::Debug for VaultSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSecretStore").field("mount_path", &self.mount_path).finish()
    }
}

impl VaultSecretStore {
    /// Build a client. No request is made until the first lookup.
    pub fn new(config: VaultStoreConfig) -> Result<Self> {
        if config.address.is_empty() {
            return Err(SecretsError::config_error("Vault address cannot be empty"));
        }
        if config.mount_path.is_empty() {
            return Err(SecretsError::config_error("Vault mount path cannot be empty"));
        }

        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&config.address);

        if let Some(ref token) = config.token {
            settings_builder.token(token.expose_secret());
        }

        if let Some(namespace) = config.namespace {
            settings_builder.namespace(Some(namespace));
        }

        let settings = settings_builder.build().map_err(|e| {
            SecretsError::config_error(format!("Invalid Vault configuration: {}", e))
        })?;

        let client = VaultClient::new(settings).map_err(|e| {
            SecretsError::connection_failed(format!("Failed to create Vault client: {}", e))
        })?;

        tracing::debug!(
            address = %config.address,
            mount_path = %config.mount_path,
            "Created Vault secret store"
        );
        Ok(Self { client, mount_path: config.mount_path })
    }

    fn path(namespace: &str, name: &str) -> String {
        format!("{}/{}", namespace, name)
    }
}

fn map_client_error(path: &str, error: ClientError) -> SecretsError {
    match error {
        ClientError::APIError { code: 404, .. } => SecretsError::not_found(path),
        ClientError::APIError { code: 401 | 403, errors } => SecretsError::authentication_failed(
            format!("Access to '{}' denied: {}", path, errors.join(", ")),
        ),
        ClientError::APIError { code, errors } => SecretsError::backend_error(format!(
            "Vault returned {} for '{}': {}",
            code,
            path,
            errors.join(", ")
        )),
        ClientError::RestClientError { source } => SecretsError::connection_failed(format!(
            "Request for '{}' failed: {}",
            path, source
        )),
        other => SecretsError::backend_error(format!("Failed to read '{}': {}", path, other)),
    }
}

#[async_trait]
impl SecretStore for VaultSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretPayload> {
        let path = Self::path(namespace, name);
        let fields: HashMap<String, serde_json::Value> =
            kv2::read(&self.client, &self.mount_path, &path).await.map_err(|e| {
                let error = map_client_error(&path, e);
                if !error.is_not_found() {
                    tracing::error!(
                        error = %error,
                        path = %path,
                        "Failed to read secret from Vault"
                    );
                }
                error
            })?;

        let mut payload = SecretPayload::new(namespace, name);
        for (key, value) in fields {
            let bytes = match value {
                serde_json::Value::String(text) => text.into_bytes(),
                other => other.to_string().into_bytes(),
            };
            payload.insert(key, bytes);
        }

        tracing::debug!(path = %path, keys = payload.len(), "Read secret from Vault");
        Ok(payload)
    }

    fn store_type(&self) -> &'static str {
        "vault"
    }
}
