//! Secret store backed by Kubernetes-style Secret manifests on disk.
//!
//! Files are YAML (JSON is a subset) and may contain several documents
//! separated by `---`. Only documents with `kind: Secret` are loaded;
//! `kind: List` documents are searched through their `items`. Everything else
//! is skipped so a full application manifest bundle can be pointed at directly.
//!
//! ```yaml
//! apiVersion: v1
//! kind: Secret
//! metadata:
//!   name: redis-creds
//!   namespace: quay-enterprise
//! data:
//!   password: Y2hhbmdlbWU=
//! stringData:
//!   note: plain text value
//! ```
//!
//! `data` values are base64-decoded; `stringData` values are taken verbatim
//! and win over `data` when both define a key.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::{Result, SecretsError};
use super::payload::SecretPayload;
use super::store::SecretStore;

const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

#[derive(Debug, Default, Deserialize)]
struct ManifestMetadata {
    name: Option<String>,
    namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretManifest {
    #[serde(default)]
    metadata: ManifestMetadata,
    #[serde(default)]
    data: Option<BTreeMap<String, String>>,
    #[serde(default)]
    string_data: Option<BTreeMap<String, String>>,
}

/// Read-only [`SecretStore`] loaded once from manifest files.
#[derive(Debug, Default)]
pub struct ManifestSecretStore {
    secrets: HashMap<(String, String), SecretPayload>,
    sources: Vec<PathBuf>,
}

impl ManifestSecretStore {
    /// Load every Secret found under `paths`.
    ///
    /// A path may be a file or a directory; directories are scanned one level
    /// deep for `.yaml`, `.yml` and `.json` files in name order. Secrets whose
    /// manifest omits `metadata.namespace` are placed in `default_namespace`.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P], default_namespace: &str) -> Result<Self> {
        let mut store = Self::default();

        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                let mut files = Vec::new();
                for entry in std::fs::read_dir(path)? {
                    let file = entry?.path();
                    let is_manifest = file
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .map(|ext| MANIFEST_EXTENSIONS.contains(&ext))
                        .unwrap_or(false);
                    if file.is_file() && is_manifest {
                        files.push(file);
                    }
                }
                files.sort();
                for file in files {
                    store.load_file(&file, default_namespace)?;
                }
            } else {
                store.load_file(path, default_namespace)?;
            }
        }

        debug!(
            secrets = store.secrets.len(),
            files = store.sources.len(),
            "Loaded secret manifests"
        );
        Ok(store)
    }

    /// Parse manifests from an in-memory document, labelled `origin` in errors.
    pub fn from_yaml_str(text: &str, origin: &str, default_namespace: &str) -> Result<Self> {
        let mut store = Self::default();
        store.load_str(text, origin, default_namespace)?;
        Ok(store)
    }

    /// Number of secrets loaded.
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Files that contributed to this store.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    fn load_file(&mut self, path: &Path, default_namespace: &str) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        self.load_str(&text, &path.display().to_string(), default_namespace)?;
        self.sources.push(path.to_path_buf());
        Ok(())
    }

    fn load_str(&mut self, text: &str, origin: &str, default_namespace: &str) -> Result<()> {
        for document in serde_yaml::Deserializer::from_str(text) {
            let value = serde_yaml::Value::deserialize(document).map_err(|source| {
                SecretsError::Manifest { source_path: origin.to_string(), source }
            })?;
            self.load_value(value, origin, default_namespace)?;
        }
        Ok(())
    }

    fn load_value(
        &mut self,
        value: serde_yaml::Value,
        origin: &str,
        default_namespace: &str,
    ) -> Result<()> {
        let kind = value.get("kind").and_then(|kind| kind.as_str()).unwrap_or_default();
        match kind {
            "Secret" => {
                let manifest: SecretManifest = serde_yaml::from_value(value).map_err(|source| {
                    SecretsError::Manifest { source_path: origin.to_string(), source }
                })?;
                let payload = decode_manifest(manifest, origin, default_namespace)?;
                let key = (payload.namespace().to_string(), payload.name().to_string());
                if self.secrets.contains_key(&key) {
                    warn!(
                        namespace = %key.0,
                        name = %key.1,
                        origin = %origin,
                        "Secret defined more than once; later definition wins"
                    );
                }
                self.secrets.insert(key, payload);
            }
            "List" => {
                if let Some(items) = value.get("items").and_then(|items| items.as_sequence()) {
                    for item in items.clone() {
                        self.load_value(item, origin, default_namespace)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn decode_manifest(
    manifest: SecretManifest,
    origin: &str,
    default_namespace: &str,
) -> Result<SecretPayload> {
    let name = manifest
        .metadata
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            SecretsError::invalid_payload(origin, "Secret manifest has no metadata.name")
        })?;
    let namespace = manifest
        .metadata
        .namespace
        .filter(|namespace| !namespace.is_empty())
        .unwrap_or_else(|| default_namespace.to_string());

    let mut payload = SecretPayload::new(&namespace, &name);
    for (key, encoded) in manifest.data.unwrap_or_default() {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
            SecretsError::invalid_payload(
                format!("{}/{}", namespace, name),
                format!("data key '{}' is not valid base64: {}", key, e),
            )
        })?;
        payload.insert(key, bytes);
    }
    for (key, text) in manifest.string_data.unwrap_or_default() {
        payload.insert(key, text.into_bytes());
    }
    Ok(payload)
}

#[async_trait]
impl SecretStore for ManifestSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretPayload> {
        self.secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| SecretsError::not_found(format!("{}/{}", namespace, name)))
    }

    fn store_type(&self) -> &'static str {
        "file"
    }
}
