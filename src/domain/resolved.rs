//! The resolved configuration produced by a successful pass.

use std::time::Duration;

use serde::Serialize;

use super::backend::RegistryBackend;
use super::config_file::ConfigFileEntry;
use super::database::ResolvedDatabase;
use super::request::{ConfigurationRequest, ExternalAccess, ScannerSpec};
use crate::secrets::{SecretBytes, SecretString};
use crate::validation::quantity::Quantity;

/// Superuser identity the registry is set up with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperuserIdentity {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

/// TLS material projected from the TLS secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsMaterial {
    pub certificate: SecretBytes,
    pub private_key: SecretBytes,
}

/// Which credentials were supplied through secrets rather than literals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidedSecrets {
    pub superuser: bool,
    pub config_password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_password_secret_name: Option<String>,
    pub redis: bool,
    pub registry_database: bool,
    pub scanner_database: bool,
}

/// Scanner settings once resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedScanner {
    #[serde(with = "humantime_serde::option", skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<Duration>,
    pub database: ResolvedDatabase,
    pub config_files: Vec<ConfigFileEntry>,
}

impl ResolvedScanner {
    pub fn from_spec(spec: &ScannerSpec) -> Self {
        Self {
            update_interval: None,
            database: ResolvedDatabase::from_spec(&spec.database),
            config_files: Vec::new(),
        }
    }
}

/// Output of a validation pass.
///
/// Created from the request at the start of a pass and enriched step by
/// step. Secret values are wrapped so `Debug` and serialization redact them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfiguration {
    pub namespace: String,
    pub superuser: SuperuserIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_password: Option<SecretString>,
    pub registry_database: ResolvedDatabase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_storage_size: Option<Quantity>,
    pub registry_config_files: Vec<ConfigFileEntry>,
    pub external_access: ExternalAccess,
    pub registry_backends: Vec<RegistryBackend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsMaterial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanner: Option<ResolvedScanner>,
    pub provided: ProvidedSecrets,
}

impl ResolvedConfiguration {
    /// Seed a configuration from the request before any step has run.
    pub fn new(request: &ConfigurationRequest) -> Self {
        let superuser = &request.registry.superuser;
        Self {
            namespace: request.namespace.clone(),
            superuser: SuperuserIdentity {
                username: superuser.username.clone(),
                email: superuser.email.clone(),
                password: superuser.password.clone(),
            },
            config_password: None,
            redis_password: None,
            registry_database: ResolvedDatabase::from_spec(&request.registry.database),
            registry_storage_size: None,
            registry_config_files: Vec::new(),
            external_access: request.registry.external_access.clone(),
            registry_backends: Vec::new(),
            tls: None,
            scanner: request.enabled_scanner().map(ResolvedScanner::from_spec),
            provided: ProvidedSecrets::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::SuperuserCredentials;

    #[test]
    fn test_seed_copies_literal_superuser() {
        let mut request = ConfigurationRequest::new("ns");
        request.registry.superuser =
            SuperuserCredentials::new("admin", "password123", "admin@example.com");

        let resolved = ResolvedConfiguration::new(&request);
        assert_eq!(resolved.namespace, "ns");
        assert_eq!(resolved.superuser.username, "admin");
        assert_eq!(resolved.superuser.password.expose_secret(), "password123");
        assert_eq!(resolved.provided, ProvidedSecrets::default());
        assert!(resolved.scanner.is_none());
    }

    #[test]
    fn test_serialization_redacts_passwords() {
        let mut request = ConfigurationRequest::new("ns");
        request.registry.superuser =
            SuperuserCredentials::new("admin", "password123", "admin@example.com");
        let mut resolved = ResolvedConfiguration::new(&request);
        resolved.redis_password = Some(SecretString::new("redis-pass"));

        let json = serde_json::to_string(&resolved).unwrap();
        assert!(!json.contains("password123"));
        assert!(!json.contains("redis-pass"));
        assert!(json.contains("\"redisPassword\":\"[REDACTED]\""));
    }

    #[test]
    fn test_interval_serializes_as_humantime() {
        let scanner = ResolvedScanner {
            update_interval: Some(Duration::from_secs(5400)),
            database: ResolvedDatabase::from_spec(&Default::default()),
            config_files: Vec::new(),
        };
        let json = serde_json::to_value(&scanner).unwrap();
        assert_eq!(json["updateInterval"], "1h 30m");
    }
}
