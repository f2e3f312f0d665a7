//! # Validation
//!
//! Building blocks used by the resolver:
//!
//! - [`secrets`]: fetch a secret and check the keys its use requires
//! - [`backends`]: per-variant storage backend rules
//! - [`config_files`]: turn config-file groups into entries
//! - [`quantity`] and [`interval`]: size and duration literals

pub mod backends;
pub mod config_files;
pub mod interval;
pub mod quantity;
pub mod secrets;

pub use backends::{rules_for, validate_backend, validate_backends, VariantRules};
pub use config_files::resolve_config_files;
pub use interval::parse_interval;
pub use quantity::Quantity;
pub use secrets::{RequiredKeys, SecretValidator};
