//! # Observability
//!
//! Structured logging for validation passes. Every pass runs inside a
//! `validation_pass` span carrying a generated pass id; secret values never
//! reach log output.

pub mod logging;

pub use logging::{init_logging, log_settings_info};
