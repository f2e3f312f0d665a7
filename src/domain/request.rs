//! The declarative request resolved by one validation pass.
//!
//! Requests are read from YAML or JSON using camelCase field names:
//!
//! ```yaml
//! namespace: quay-enterprise
//! registry:
//!   superuserCredentialsSecretName: quay-superuser
//!   configSecretName: quay-config
//!   database:
//!     credentialsSecretName: quay-db
//!     volumeSize: 10Gi
//!   registryBackends:
//!     - name: default
//!       local:
//!         storagePath: /datastorage/registry
//!   externalAccess:
//!     type: Route
//! cache:
//!   credentialsSecretName: redis-creds
//! platform:
//!   supportsRoutes: true
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::backend::RegistryBackend;
use super::config_file::ConfigFileGroup;
use super::database::DatabaseSpec;
use crate::secrets::SecretString;

/// Treat an empty reference the same as an absent one.
pub fn named(reference: &Option<String>) -> Option<&str> {
    reference.as_deref().filter(|name| !name.is_empty())
}

/// Everything one pass needs to know about the ecosystem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigurationRequest {
    pub namespace: String,
    pub registry: RegistrySpec,
    pub cache: CacheSpec,
    pub scanner: Option<ScannerSpec>,
    pub platform: PlatformCapabilities,
    pub status: EcosystemStatus,
}

impl ConfigurationRequest {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), ..Default::default() }
    }

    /// Decode a request from YAML (JSON documents are accepted too).
    pub fn from_yaml_str(text: &str) -> crate::Result<Self> {
        serde_yaml::from_str(text).map_err(|e| {
            let context = format!("Failed to decode configuration request: {}", e);
            crate::Error::serialization(context, Box::new(e))
        })
    }

    /// Scanner spec when one is declared and enabled.
    pub fn enabled_scanner(&self) -> Option<&ScannerSpec> {
        self.scanner.as_ref().filter(|scanner| scanner.enabled)
    }
}

/// Primary registry service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrySpec {
    pub superuser_credentials_secret_name: Option<String>,
    pub superuser: SuperuserCredentials,
    pub config_secret_name: Option<String>,
    pub image_pull_secret_name: Option<String>,
    pub skip_setup: bool,
    pub database: DatabaseSpec,
    pub registry_storage: Option<RegistryStorageSpec>,
    pub enable_storage_replication: bool,
    pub registry_backends: Vec<RegistryBackend>,
    pub config_files: Vec<ConfigFileGroup>,
    pub external_access: ExternalAccess,
}

/// Literal superuser credentials, used when no secret supplies them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuperuserCredentials {
    pub username: String,
    #[serde(skip_serializing_if = "SecretString::is_empty")]
    pub password: SecretString,
    pub email: String,
}

impl SuperuserCredentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<SecretString>,
        email: impl Into<String>,
    ) -> Self {
        Self { username: username.into(), password: password.into(), email: email.into() }
    }
}

/// Persistent volume backing local registry storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryStorageSpec {
    pub persistent_volume_size: Option<String>,
}

/// Cache (redis) service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSpec {
    pub image_pull_secret_name: Option<String>,
    pub credentials_secret_name: Option<String>,
}

/// Vulnerability scanner service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannerSpec {
    pub enabled: bool,
    pub image_pull_secret_name: Option<String>,
    /// Duration literal, e.g. `500m` or `1h 30m`
    pub update_interval: Option<String>,
    pub database: DatabaseSpec,
    pub config_files: Vec<ConfigFileGroup>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformCapabilities {
    /// Route-type external access is available
    pub supports_routes: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EcosystemStatus {
    pub setup_complete: bool,
}

/// How the registry is exposed outside the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalAccessType {
    Route,
    LoadBalancer,
    NodePort,
    Ingress,
}

impl ExternalAccessType {
    /// Access types that cannot work without a hostname.
    pub fn requires_hostname(&self) -> bool {
        matches!(self, ExternalAccessType::NodePort | ExternalAccessType::Ingress)
    }
}

impl fmt::Display for ExternalAccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalAccessType::Route => write!(f, "Route"),
            ExternalAccessType::LoadBalancer => write!(f, "LoadBalancer"),
            ExternalAccessType::NodePort => write!(f, "NodePort"),
            ExternalAccessType::Ingress => write!(f, "Ingress"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalAccess {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub access_type: Option<ExternalAccessType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsSpec>,
}

impl ExternalAccess {
    pub fn tls_secret_name(&self) -> Option<&str> {
        self.tls.as_ref().and_then(|tls| named(&tls.secret_name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TlsSpec {
    pub secret_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backend::{AzureStorage, BackendKind, RegistryStorage};

    const REQUEST: &str = r#"
namespace: quay-enterprise
registry:
  superuserCredentialsSecretName: quay-superuser
  superuser:
    username: admin
    password: literal-password
  skipSetup: false
  database:
    credentialsSecretName: quay-db
    volumeSize: 10Gi
  registryStorage:
    persistentVolumeSize: 50Gi
  registryBackends:
    - name: default
      local:
        storagePath: /datastorage/registry
  configFiles:
    - secretName: extra-config
  externalAccess:
    type: NodePort
    hostname: quay.example.com
    tls:
      secretName: quay-tls
cache:
  credentialsSecretName: redis-creds
scanner:
  enabled: true
  updateInterval: 2h
platform:
  supportsRoutes: false
status:
  setupComplete: true
"#;

    #[test]
    fn test_decode_full_request() {
        let request = ConfigurationRequest::from_yaml_str(REQUEST).unwrap();
        assert_eq!(request.namespace, "quay-enterprise");
        assert_eq!(request.registry.superuser.password.expose_secret(), "literal-password");
        assert_eq!(request.registry.database.volume_size.as_deref(), Some("10Gi"));
        assert_eq!(request.registry.registry_backends[0].kind(), BackendKind::Local);
        let access = &request.registry.external_access;
        assert_eq!(access.access_type, Some(ExternalAccessType::NodePort));
        assert_eq!(request.registry.external_access.tls_secret_name(), Some("quay-tls"));
        assert_eq!(request.cache.credentials_secret_name.as_deref(), Some("redis-creds"));
        assert!(request.status.setup_complete);
        let interval = request.enabled_scanner().and_then(|s| s.update_interval.as_deref());
        assert_eq!(interval, Some("2h"));
    }

    #[test]
    fn test_minimal_request_uses_defaults() {
        let request = ConfigurationRequest::from_yaml_str("namespace: ns\n").unwrap();
        assert!(!request.registry.skip_setup);
        assert!(request.registry.registry_backends.is_empty());
        assert!(request.scanner.is_none());
        assert!(!request.platform.supports_routes);
    }

    #[test]
    fn test_disabled_scanner_is_ignored() {
        let text = "namespace: ns\nscanner:\n  enabled: false\n";
        let request = ConfigurationRequest::from_yaml_str(text).unwrap();
        assert!(request.scanner.is_some());
        assert!(request.enabled_scanner().is_none());
    }

    #[test]
    fn test_invalid_document_is_serialization_error() {
        let err = ConfigurationRequest::from_yaml_str("registry: [").unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Serialization);
    }

    #[test]
    fn test_encoded_request_decodes_to_itself() {
        let mut request = ConfigurationRequest::from_yaml_str(REQUEST).unwrap();
        // Literal passwords are redacted on output.
        request.registry.superuser.password = SecretString::default();
        let storage = RegistryStorage::Azure(AzureStorage {
            storage_path: "/reg".to_string(),
            container_name: "images".to_string(),
        });
        request
            .registry
            .registry_backends
            .push(RegistryBackend::new("blob", storage).with_credentials_secret("azure-creds"));

        let yaml = serde_yaml::to_string(&request).unwrap();
        assert_eq!(ConfigurationRequest::from_yaml_str(&yaml).unwrap(), request);

        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(serde_json::from_str::<ConfigurationRequest>(&json).unwrap(), request);
    }

    #[test]
    fn test_backend_with_two_variants_fails_decoding() {
        let text = r#"
registry:
  registryBackends:
    - name: dual
      s3:
        storagePath: /a
        bucketName: b
      azure:
        storagePath: /a
        containerName: c
"#;
        let err = ConfigurationRequest::from_yaml_str(text).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Serialization);
        let source = std::error::Error::source(&err).map(|s| s.to_string()).unwrap_or_default();
        assert!(source.contains("backend 'dual' declares 2 storage variants"), "{}", source);
    }

    #[test]
    fn test_named_treats_empty_as_absent() {
        assert_eq!(named(&Some(String::new())), None);
        assert_eq!(named(&Some("x".to_string())), Some("x"));
        assert_eq!(named(&None), None);
    }

    #[test]
    fn test_hostname_requirement() {
        assert!(ExternalAccessType::NodePort.requires_hostname());
        assert!(ExternalAccessType::Ingress.requires_hostname());
        assert!(!ExternalAccessType::Route.requires_hostname());
        assert!(!ExternalAccessType::LoadBalancer.requires_hostname());
    }
}
