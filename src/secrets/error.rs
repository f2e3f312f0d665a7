//! Error types for secret store operations.

use thiserror::Error;

/// Result type for secret store operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors that can occur while reading secrets from a store.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// Secret not found in the store.
    #[error("Secret not found: {key}")]
    NotFound { key: String },

    /// Failed to connect to the secret store.
    #[error("Store connection failed: {message}")]
    ConnectionFailed { message: String },

    /// Authentication with the secret store failed.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The stored object could not be interpreted as a secret payload.
    #[error("Invalid secret payload for '{key}': {reason}")]
    InvalidPayload { key: String, reason: String },

    /// Store-specific error.
    #[error("Store error: {message}")]
    BackendError { message: String },

    /// Store configuration error.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Manifest decoding error.
    #[error("Manifest error in {source_path}: {source}")]
    Manifest {
        source_path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SecretsError {
    /// Create a not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed { message: message.into() }
    }

    /// Create an authentication failed error.
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed { message: message.into() }
    }

    /// Create an invalid payload error.
    pub fn invalid_payload(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload { key: key.into(), reason: reason.into() }
    }

    /// Create a backend error.
    pub fn backend_error(message: impl Into<String>) -> Self {
        Self::BackendError { message: message.into() }
    }

    /// Create a config error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into() }
    }

    /// True when the store reported the secret as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
