//! # Error Types
//!
//! Error taxonomy for a validation pass using `thiserror`.

use std::fmt;

use crate::secrets::SecretsError;

/// Custom result type for resolver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for configuration resolution
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A referenced secret does not exist
    #[error("Secret not found. Namespace: {namespace}, Name: {name}")]
    NotFound { namespace: String, name: String },

    /// A resolved secret lacks a key its context requires
    #[error(
        "Failed to validate provided secret with required parameters. \
         Namespace: {namespace}, Name: {name}, Missing key: {key}"
    )]
    MissingKey {
        namespace: String,
        name: String,
        key: String,
        label: Option<String>,
    },

    /// A structural or semantic rule was violated
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        entity: Option<String>,
    },

    /// Two individually valid settings may not be combined
    #[error("Invalid combination: {message}")]
    InvalidCombination { message: String, entity: String },

    /// A size or duration literal is malformed
    #[error("Failed to parse {what} '{literal}': {message}")]
    Parse {
        what: &'static str,
        literal: String,
        message: String,
    },

    /// The secret store failed for a reason other than a missing secret
    #[error("Secret store error. Namespace: {namespace}, Name: {name}: {source}")]
    SecretStore {
        namespace: String,
        name: String,
        #[source]
        source: SecretsError,
    },

    /// Settings could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A request document could not be decoded
    #[error("Serialization error: {context}")]
    Serialization {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Stable classification of [`Error`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    MissingKey,
    Validation,
    InvalidCombination,
    Parse,
    SecretStore,
    Config,
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::MissingKey => write!(f, "missing_key"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::InvalidCombination => write!(f, "invalid_combination"),
            ErrorKind::Parse => write!(f, "parse"),
            ErrorKind::SecretStore => write!(f, "secret_store"),
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::Serialization => write!(f, "serialization"),
        }
    }
}

impl Error {
    /// Create a not found error
    pub fn not_found<N: Into<String>, S: Into<String>>(namespace: N, name: S) -> Self {
        Self::NotFound { namespace: namespace.into(), name: name.into() }
    }

    /// Create a missing key error
    pub fn missing_key<N: Into<String>, S: Into<String>, K: Into<String>>(
        namespace: N,
        name: S,
        key: K,
    ) -> Self {
        Self::MissingKey {
            namespace: namespace.into(),
            name: name.into(),
            key: key.into(),
            label: None,
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), entity: None }
    }

    /// Create a validation error naming the offending entity
    pub fn validation_entity<S: Into<String>, E: Into<String>>(message: S, entity: E) -> Self {
        Self::Validation { message: message.into(), entity: Some(entity.into()) }
    }

    /// Create an invalid combination error
    pub fn invalid_combination<S: Into<String>, E: Into<String>>(message: S, entity: E) -> Self {
        Self::InvalidCombination { message: message.into(), entity: entity.into() }
    }

    /// Create a parse error for a literal
    pub fn parse<L: Into<String>, M: fmt::Display>(
        what: &'static str,
        literal: L,
        message: M,
    ) -> Self {
        Self::Parse { what, literal: literal.into(), message: message.to_string() }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(
        context: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Serialization { context: context.into(), source }
    }

    /// Classify a secret store failure for the given secret.
    ///
    /// A store-level not-found becomes [`Error::NotFound`]; anything else is
    /// kept as [`Error::SecretStore`].
    pub fn from_store<N: Into<String>, S: Into<String>>(
        namespace: N,
        name: S,
        source: SecretsError,
    ) -> Self {
        match source {
            SecretsError::NotFound { .. } => Self::not_found(namespace, name),
            other => {
                Self::SecretStore { namespace: namespace.into(), name: name.into(), source: other }
            }
        }
    }

    /// Stable kind for matching without destructuring
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::MissingKey { .. } => ErrorKind::MissingKey,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::InvalidCombination { .. } => ErrorKind::InvalidCombination,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::SecretStore { .. } => ErrorKind::SecretStore,
            Error::Config { .. } => ErrorKind::Config,
            Error::Serialization { .. } => ErrorKind::Serialization,
        }
    }

    /// Entity named by the error, when there is one
    pub fn entity(&self) -> Option<&str> {
        match self {
            Error::Validation { entity, .. } => entity.as_deref(),
            Error::InvalidCombination { entity, .. } => Some(entity),
            Error::NotFound { name, .. }
            | Error::MissingKey { name, .. }
            | Error::SecretStore { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_validation_messages("", &errors, &mut messages);
        messages.sort();

        Self::config(format!("Invalid settings: {}", messages.join("; ")))
    }
}

/// Flatten nested validator errors into `path: message` strings.
fn collect_validation_messages(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<String>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path =
            if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                out.push(format!("{}: {}", path, error_messages.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_messages(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_messages(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_secret() {
        let error = Error::not_found("quay-enterprise", "db-creds");
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert!(error.to_string().contains("quay-enterprise"));
        assert!(error.to_string().contains("db-creds"));
    }

    #[test]
    fn test_missing_key_message() {
        let error = Error::missing_key("ns", "redis", "password");
        let message = error.to_string();
        assert!(message.contains("Namespace: ns"));
        assert!(message.contains("Name: redis"));
        assert!(message.contains("password"));
        assert_eq!(error.entity(), Some("redis"));
    }

    #[test]
    fn test_from_store_keeps_not_found_split() {
        let error = Error::from_store("ns", "s", SecretsError::not_found("ns/s"));
        assert_eq!(error.kind(), ErrorKind::NotFound);

        let error = Error::from_store("ns", "s", SecretsError::connection_failed("refused"));
        assert_eq!(error.kind(), ErrorKind::SecretStore);
        assert!(error.to_string().contains("refused"));
    }

    #[test]
    fn test_entity_for_validation_errors() {
        assert_eq!(Error::validation("plain").entity(), None);
        assert_eq!(Error::validation_entity("bad", "s3-primary").entity(), Some("s3-primary"));
        assert_eq!(Error::invalid_combination("bad", "local").entity(), Some("local"));
    }

    #[test]
    fn test_parse_error_echoes_parser() {
        let error = Error::parse("duration", "1x", "unknown time unit \"x\"");
        assert_eq!(error.kind(), ErrorKind::Parse);
        assert!(error.to_string().contains("unknown time unit"));
        assert!(error.to_string().contains("'1x'"));
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::InvalidCombination.to_string(), "invalid_combination");
        assert_eq!(ErrorKind::MissingKey.to_string(), "missing_key");
    }
}
