//! # Error Handling
//!
//! Error types for configuration resolution using `thiserror`.
//!
//! Every validation step returns [`Result`]; the first [`Error`] aborts the
//! pass and is handed to the caller unchanged.

pub mod types;

pub use types::{Error, ErrorKind, Result};
