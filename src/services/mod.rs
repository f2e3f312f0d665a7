//! # Services
//!
//! Business logic on top of the domain and validation layers.

pub mod configuration_resolver;

pub use configuration_resolver::ConfigurationResolver;
