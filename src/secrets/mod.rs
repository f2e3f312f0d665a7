//! Secret lookup for configuration resolution.
//!
//! The resolver only ever reads secrets. All access goes through the
//! [`SecretStore`] trait, which returns a whole [`SecretPayload`] for a
//! `(namespace, name)` pair and reports a missing secret distinctly from any
//! other failure.
//!
//! # Stores
//!
//! - [`InMemorySecretStore`]: map-backed, for tests and embedding
//! - [`ManifestSecretStore`]: Kubernetes Secret manifests loaded from disk
//! - `VaultSecretStore`: HashiCorp Vault KV v2 (feature `vault`)
//!
//! # Example
//!
//! ```rust,ignore
//! use ecosystem_config::secrets::{ManifestSecretStore, SecretStore};
//!
//! let store = ManifestSecretStore::from_paths(&["deploy/secrets"], "quay-enterprise")?;
//! let payload = store.get("quay-enterprise", "redis-creds").await?;
//! assert!(payload.contains_key("password"));
//! ```
//!
//! Secret values are carried as [`SecretString`] / [`SecretBytes`] once
//! projected, so they never show up in logs or serialized output.

pub mod error;
pub mod manifest;
pub mod memory;
pub mod payload;
pub mod store;
pub mod types;
#[cfg(feature = "vault")]
pub mod vault;

pub use error::{Result, SecretsError};
pub use manifest::ManifestSecretStore;
pub use memory::InMemorySecretStore;
pub use payload::SecretPayload;
pub use store::SecretStore;
pub use types::{SecretBytes, SecretString};
#[cfg(feature = "vault")]
pub use vault::{VaultSecretStore, VaultStoreConfig};
