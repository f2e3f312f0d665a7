//! # Ecosystem Config
//!
//! Validates and resolves the deployment configuration of a container
//! registry ecosystem (registry, cache, scanner) against a secret store.
//!
//! A [`ConfigurationRequest`] names secrets for credentials, storage backends,
//! configuration files and TLS material. [`ConfigurationResolver`] walks a
//! fixed checklist, fetching each secret through a [`SecretStore`], checking
//! required keys and parsing size and duration literals. It returns either a
//! [`ResolvedConfiguration`] or the first failure.
//!
//! ```text
//! request ──► ConfigurationResolver ──► ResolvedConfiguration
//!                    │
//!                    ▼
//!              SecretStore (memory | manifest files | Vault KV v2)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ecosystem_config::{ConfigurationRequest, ConfigurationResolver, Result};
//! use ecosystem_config::domain::SuperuserCredentials;
//! use ecosystem_config::secrets::InMemorySecretStore;
//!
//! # async fn run() -> Result<()> {
//! let store = InMemorySecretStore::new()
//!     .with_secret("quay", "redis", [("password", "hunter22")]);
//! let mut request = ConfigurationRequest::new("quay");
//! request.registry.superuser =
//!     SuperuserCredentials::new("admin", "password123", "admin@example.com");
//! request.cache.credentials_secret_name = Some("redis".to_string());
//!
//! let resolved = ConfigurationResolver::new(Arc::new(store)).resolve(&request).await?;
//! assert!(resolved.provided.redis);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod secrets;
pub mod services;
pub mod validation;

// Re-export commonly used types and traits
pub use config::Settings;
pub use domain::{ConfigurationRequest, ResolvedConfiguration};
pub use errors::{Error, ErrorKind, Result};
pub use secrets::SecretStore;
pub use services::ConfigurationResolver;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
