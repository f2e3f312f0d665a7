//! # Configuration Management
//!
//! Runtime settings for the resolver: default namespace, secret store
//! selection and logging.

pub mod settings;

pub use settings::{LoggingSettings, Settings, StoreKind, VaultSettings, ENV_PREFIX};
