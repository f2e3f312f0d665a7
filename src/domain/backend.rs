//! Registry storage backend declarations.
//!
//! A backend is declared with a name and exactly one storage variant:
//!
//! ```yaml
//! registryBackends:
//!   - name: s3-primary
//!     credentialsSecretName: s3-creds
//!     s3:
//!       storagePath: /registry
//!       bucketName: quay-images
//!       host: s3.us-east-1.amazonaws.com
//!   - name: local
//!     local:
//!       storagePath: /datastorage/registry
//! ```
//!
//! Credentials come either from a secret (`credentialsSecretName`) or inline
//! (`credentials`). A secret reference takes precedence over inline values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::secrets::SecretString;

/// Storage backend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Local,
    S3,
    Azure,
    GoogleCloud,
    Rhocs,
    Rados,
    Swift,
    CloudfrontS3,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Local => "local",
            BackendKind::S3 => "s3",
            BackendKind::Azure => "azure",
            BackendKind::GoogleCloud => "googleCloud",
            BackendKind::Rhocs => "rhocs",
            BackendKind::Rados => "rados",
            BackendKind::Swift => "swift",
            BackendKind::CloudfrontS3 => "cloudfrontS3",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalStorage {
    pub storage_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct S3Storage {
    pub storage_path: String,
    pub bucket_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AzureStorage {
    pub storage_path: String,
    pub container_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleCloudStorage {
    pub storage_path: String,
    pub bucket_name: String,
}

/// RHOCS and RADOS share one shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectGatewayStorage {
    pub storage_path: String,
    pub bucket_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwiftStorage {
    pub storage_path: String,
    pub container: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudfrontS3Storage {
    pub storage_path: String,
    pub bucket_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
}

/// Storage variant of a backend. Exactly one per declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegistryStorage {
    Local(LocalStorage),
    S3(S3Storage),
    Azure(AzureStorage),
    GoogleCloud(GoogleCloudStorage),
    Rhocs(ObjectGatewayStorage),
    Rados(ObjectGatewayStorage),
    Swift(SwiftStorage),
    #[serde(rename = "cloudfrontS3")]
    CloudfrontS3(CloudfrontS3Storage),
}

impl RegistryStorage {
    pub fn kind(&self) -> BackendKind {
        match self {
            RegistryStorage::Local(_) => BackendKind::Local,
            RegistryStorage::S3(_) => BackendKind::S3,
            RegistryStorage::Azure(_) => BackendKind::Azure,
            RegistryStorage::GoogleCloud(_) => BackendKind::GoogleCloud,
            RegistryStorage::Rhocs(_) => BackendKind::Rhocs,
            RegistryStorage::Rados(_) => BackendKind::Rados,
            RegistryStorage::Swift(_) => BackendKind::Swift,
            RegistryStorage::CloudfrontS3(_) => BackendKind::CloudfrontS3,
        }
    }

    pub fn storage_path(&self) -> &str {
        match self {
            RegistryStorage::Local(s) => &s.storage_path,
            RegistryStorage::S3(s) => &s.storage_path,
            RegistryStorage::Azure(s) => &s.storage_path,
            RegistryStorage::GoogleCloud(s) => &s.storage_path,
            RegistryStorage::Rhocs(s) | RegistryStorage::Rados(s) => &s.storage_path,
            RegistryStorage::Swift(s) => &s.storage_path,
            RegistryStorage::CloudfrontS3(s) => &s.storage_path,
        }
    }

    /// Bucket or container name. `None` for local storage.
    pub fn location(&self) -> Option<&str> {
        match self {
            RegistryStorage::Local(_) => None,
            RegistryStorage::S3(s) => Some(&s.bucket_name),
            RegistryStorage::Azure(s) => Some(&s.container_name),
            RegistryStorage::GoogleCloud(s) => Some(&s.bucket_name),
            RegistryStorage::Rhocs(s) | RegistryStorage::Rados(s) => Some(&s.bucket_name),
            RegistryStorage::Swift(s) => Some(&s.container),
            RegistryStorage::CloudfrontS3(s) => Some(&s.bucket_name),
        }
    }
}

/// Credentials materialized for a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StorageCredentials {
    #[serde(rename_all = "camelCase")]
    AccessKey { access_key: SecretString, secret_key: SecretString },
    #[serde(rename_all = "camelCase")]
    Azure {
        account_name: String,
        account_key: SecretString,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sas_token: Option<SecretString>,
    },
    Swift { user: String, password: SecretString },
}

impl StorageCredentials {
    /// Short name of the credential shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            StorageCredentials::AccessKey { .. } => "access key",
            StorageCredentials::Azure { .. } => "azure account",
            StorageCredentials::Swift { .. } => "swift user",
        }
    }
}

/// Where a backend's credentials stand.
///
/// A backend that passed validation is never `Unresolved`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendCredentials {
    #[default]
    None,
    Unresolved { secret_name: String },
    Resolved { credentials: StorageCredentials },
}

impl BackendCredentials {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, BackendCredentials::Unresolved { .. })
    }

    pub fn resolved(&self) -> Option<&StorageCredentials> {
        match self {
            BackendCredentials::Resolved { credentials } => Some(credentials),
            _ => None,
        }
    }
}

/// A declared registry storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegistryBackendManifest", into = "RegistryBackendManifest")]
pub struct RegistryBackend {
    pub name: String,
    pub storage: RegistryStorage,
    pub credentials: BackendCredentials,
}

impl RegistryBackend {
    pub fn new(name: impl Into<String>, storage: RegistryStorage) -> Self {
        Self { name: name.into(), storage, credentials: BackendCredentials::None }
    }

    /// Reference a credentials secret.
    pub fn with_credentials_secret(mut self, secret_name: impl Into<String>) -> Self {
        self.credentials = BackendCredentials::Unresolved { secret_name: secret_name.into() };
        self
    }

    /// Supply credentials inline.
    pub fn with_credentials(mut self, credentials: StorageCredentials) -> Self {
        self.credentials = BackendCredentials::Resolved { credentials };
        self
    }

    pub fn kind(&self) -> BackendKind {
        self.storage.kind()
    }
}

/// Wire form of a backend declaration, one optional key per storage variant.
#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryBackendManifest {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials_secret_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials: Option<StorageCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local: Option<LocalStorage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    s3: Option<S3Storage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    azure: Option<AzureStorage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    google_cloud: Option<GoogleCloudStorage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rhocs: Option<ObjectGatewayStorage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rados: Option<ObjectGatewayStorage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    swift: Option<SwiftStorage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cloudfront_s3: Option<CloudfrontS3Storage>,
}

impl RegistryBackendManifest {
    fn take_storage(&mut self) -> Vec<RegistryStorage> {
        [
            self.local.take().map(RegistryStorage::Local),
            self.s3.take().map(RegistryStorage::S3),
            self.azure.take().map(RegistryStorage::Azure),
            self.google_cloud.take().map(RegistryStorage::GoogleCloud),
            self.rhocs.take().map(RegistryStorage::Rhocs),
            self.rados.take().map(RegistryStorage::Rados),
            self.swift.take().map(RegistryStorage::Swift),
            self.cloudfront_s3.take().map(RegistryStorage::CloudfrontS3),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl TryFrom<RegistryBackendManifest> for RegistryBackend {
    type Error = String;

    fn try_from(mut manifest: RegistryBackendManifest) -> Result<Self, Self::Error> {
        let mut declared = manifest.take_storage();
        let storage = match declared.len() {
            1 => declared.remove(0),
            0 => {
                return Err(format!(
                    "backend '{}' declares no storage variant; exactly one is required",
                    manifest.name
                ))
            }
            _ => {
                let kinds: Vec<String> = declared.iter().map(|s| s.kind().to_string()).collect();
                return Err(format!(
                    "backend '{}' declares {} storage variants ({}); exactly one is required",
                    manifest.name,
                    declared.len(),
                    kinds.join(", ")
                ));
            }
        };

        let credentials = match (manifest.credentials_secret_name, manifest.credentials) {
            (Some(secret_name), _) if !secret_name.is_empty() => {
                BackendCredentials::Unresolved { secret_name }
            }
            (_, Some(credentials)) => BackendCredentials::Resolved { credentials },
            _ => BackendCredentials::None,
        };
        Ok(Self { name: manifest.name, storage, credentials })
    }
}

impl From<RegistryBackend> for RegistryBackendManifest {
    fn from(backend: RegistryBackend) -> Self {
        let mut manifest = RegistryBackendManifest { name: backend.name, ..Default::default() };
        match backend.credentials {
            BackendCredentials::None => {}
            BackendCredentials::Unresolved { secret_name } => {
                manifest.credentials_secret_name = Some(secret_name)
            }
            BackendCredentials::Resolved { credentials } => {
                manifest.credentials = Some(credentials)
            }
        }
        match backend.storage {
            RegistryStorage::Local(s) => manifest.local = Some(s),
            RegistryStorage::S3(s) => manifest.s3 = Some(s),
            RegistryStorage::Azure(s) => manifest.azure = Some(s),
            RegistryStorage::GoogleCloud(s) => manifest.google_cloud = Some(s),
            RegistryStorage::Rhocs(s) => manifest.rhocs = Some(s),
            RegistryStorage::Rados(s) => manifest.rados = Some(s),
            RegistryStorage::Swift(s) => manifest.swift = Some(s),
            RegistryStorage::CloudfrontS3(s) => manifest.cloudfront_s3 = Some(s),
        }
        manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_secret_backed_s3() {
        let backend: RegistryBackend = serde_json::from_str(
            r#"{"name":"s3-primary","credentialsSecretName":"s3-creds",
                "s3":{"storagePath":"/reg","bucketName":"images"}}"#,
        )
        .unwrap();
        assert_eq!(backend.kind(), BackendKind::S3);
        assert_eq!(backend.storage.storage_path(), "/reg");
        assert_eq!(backend.storage.location(), Some("images"));
        assert_eq!(
            backend.credentials,
            BackendCredentials::Unresolved { secret_name: "s3-creds".to_string() }
        );
    }

    #[test]
    fn test_deserialize_inline_azure_credentials() {
        let backend: RegistryBackend = serde_yaml::from_str(
            r#"
name: blob
azure:
  storagePath: /reg
  containerName: images
credentials:
  accountName: acct
  accountKey: key
"#,
        )
        .unwrap();
        match backend.credentials.resolved() {
            Some(StorageCredentials::Azure { account_name, sas_token, .. }) => {
                assert_eq!(account_name, "acct");
                assert!(sas_token.is_none());
            }
            other => panic!("unexpected credentials: {:?}", other),
        }
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let backend: RegistryBackend =
            serde_json::from_str(r#"{"name":"gcs","googleCloud":{"storagePath":"/reg"}}"#).unwrap();
        assert_eq!(backend.storage.location(), Some(""));
        assert_eq!(backend.credentials, BackendCredentials::None);
    }

    #[test]
    fn test_empty_secret_name_is_no_reference() {
        let backend: RegistryBackend = serde_json::from_str(
            r#"{"name":"l","credentialsSecretName":"","local":{"storagePath":"/d"}}"#,
        )
        .unwrap();
        assert_eq!(backend.kind(), BackendKind::Local);
        assert_eq!(backend.storage.location(), None);
        assert_eq!(backend.credentials, BackendCredentials::None);
    }

    #[test]
    fn test_serialization_redacts_credentials() {
        let backend = RegistryBackend::new(
            "swift",
            RegistryStorage::Swift(SwiftStorage {
                storage_path: "/reg".to_string(),
                container: "c".to_string(),
                ..Default::default()
            }),
        )
        .with_credentials(StorageCredentials::Swift {
            user: "svc".to_string(),
            password: SecretString::new("swift-pass"),
        });
        let json = serde_json::to_value(&backend).unwrap();
        assert_eq!(json["swift"]["container"], "c");
        assert_eq!(json["credentials"]["user"], "svc");
        assert_eq!(json["credentials"]["password"], "[REDACTED]");
        assert!(!json.to_string().contains("swift-pass"));
    }

    #[test]
    fn test_serialized_backend_decodes_to_itself() {
        let backends = vec![
            RegistryBackend::new(
                "s3-primary",
                RegistryStorage::S3(S3Storage {
                    storage_path: "/reg".to_string(),
                    bucket_name: "images".to_string(),
                    port: Some(9000),
                    ..Default::default()
                }),
            )
            .with_credentials_secret("s3-creds"),
            RegistryBackend::new(
                "ceph",
                RegistryStorage::Rados(ObjectGatewayStorage {
                    storage_path: "/reg".to_string(),
                    bucket_name: "quay".to_string(),
                    secure: Some(true),
                    ..Default::default()
                }),
            ),
        ];

        let yaml = serde_yaml::to_string(&backends).unwrap();
        assert!(yaml.contains("credentialsSecretName: s3-creds"));
        assert!(!yaml.contains("state"));

        let decoded: Vec<RegistryBackend> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(decoded, backends);
    }

    #[test]
    fn test_two_storage_variants_rejected() {
        let err = serde_json::from_str::<RegistryBackend>(
            r#"{"name":"x","s3":{"storagePath":"/a","bucketName":"b"},
                "azure":{"storagePath":"/a","containerName":"c"}}"#,
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("backend 'x'"), "{}", err);
        assert!(err.contains("2 storage variants (s3, azure)"), "{}", err);
    }

    #[test]
    fn test_missing_storage_variant_rejected() {
        let err = serde_json::from_str::<RegistryBackend>(
            r#"{"name":"bare","credentialsSecretName":"creds"}"#,
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("backend 'bare' declares no storage variant"), "{}", err);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(BackendKind::CloudfrontS3.to_string(), "cloudfrontS3");
        assert_eq!(BackendKind::GoogleCloud.to_string(), "googleCloud");
    }
}
