//! # Configuration Settings
//!
//! Settings are layered: built-in defaults, then an optional settings file
//! (YAML, TOML or JSON), then `ECOSYSTEM_`-prefixed environment variables.
//! Nested keys use a double underscore, e.g. `ECOSYSTEM_VAULT__ADDRESS`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::{Error, Result};
use crate::secrets::{ManifestSecretStore, SecretStore, SecretString};

/// Environment variable prefix for settings
pub const ENV_PREFIX: &str = "ECOSYSTEM";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Which secret store backs a validation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Kubernetes Secret manifests on disk
    #[default]
    File,
    /// HashiCorp Vault KV v2
    Vault,
}

impl std::str::FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "file" => Ok(StoreKind::File),
            "vault" => Ok(StoreKind::Vault),
            other => Err(Error::config(format!(
                "Unknown secret store '{}': expected 'file' or 'vault'",
                other
            ))),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// Namespace used when a request or manifest does not name one
    #[validate(length(min = 1, message = "Namespace cannot be empty"))]
    pub namespace: String,

    /// Overrides the request's route capability flag when set
    pub supports_routes: Option<bool>,

    /// Secret store selection
    pub store: StoreKind,

    /// Manifest files or directories for the file store
    pub secrets_paths: Vec<PathBuf>,

    #[validate(nested)]
    pub vault: VaultSettings,

    #[validate(nested)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            namespace: "quay-enterprise".to_string(),
            supports_routes: None,
            store: StoreKind::File,
            secrets_paths: Vec::new(),
            vault: VaultSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Vault connection settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VaultSettings {
    pub address: String,
    pub token: Option<SecretString>,
    pub namespace: Option<String>,
    #[validate(length(min = 1, message = "Vault mount path cannot be empty"))]
    pub mount_path: String,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            address: String::new(),
            token: None,
            namespace: None,
            mount_path: "secret".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter level; `RUST_LOG` takes precedence when set
    #[validate(custom(function = "validate_log_level"))]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

fn validate_log_level(level: &str) -> std::result::Result<(), ValidationError> {
    if LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("log_level");
        error.message = Some(format!("Log level must be one of {}", LOG_LEVELS.join(", ")).into());
        Err(error)
    }
}

impl Settings {
    /// Load settings from an optional file plus `ECOSYSTEM_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load settings reading environment variables with `prefix`.
    pub fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::config(format!(
                    "Settings file '{}' does not exist",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("secrets_paths"),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if self.store == StoreKind::Vault && self.vault.address.is_empty() {
            return Err(Error::config("Vault address is required when the vault store is selected"));
        }
        Ok(())
    }

    /// Open the configured secret store.
    pub fn open_secret_store(&self) -> Result<Arc<dyn SecretStore>> {
        match self.store {
            StoreKind::File => {
                if self.secrets_paths.is_empty() {
                    return Err(Error::config(
                        "At least one secrets path is required for the file store",
                    ));
                }
                let store = ManifestSecretStore::from_paths(&self.secrets_paths, &self.namespace)
                    .map_err(|e| {
                        Error::config_with_source("Failed to load secret manifests", Box::new(e))
                    })?;
                Ok(Arc::new(store))
            }
            StoreKind::Vault => self.open_vault_store(),
        }
    }

    #[cfg(feature = "vault")]
    fn open_vault_store(&self) -> Result<Arc<dyn SecretStore>> {
        use crate::secrets::{VaultSecretStore, VaultStoreConfig};

        let store = VaultSecretStore::new(VaultStoreConfig {
            address: self.vault.address.clone(),
            token: self.vault.token.clone(),
            namespace: self.vault.namespace.clone(),
            mount_path: self.vault.mount_path.clone(),
        })
        .map_err(|e| {
            Error::config_with_source("Failed to create Vault secret store", Box::new(e))
        })?;
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "vault"))]
    fn open_vault_store(&self) -> Result<Arc<dyn SecretStore>> {
        Err(Error::config("Vault support is not enabled in this build"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.store, StoreKind::File);
        assert_eq!(settings.vault.mount_path, "secret");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            "namespace: registry\n\
             supports_routes: true\n\
             store: vault\n\
             vault:\n  address: http://vault:8200\n\
             logging:\n  level: debug\n"
        )
        .unwrap();

        let settings =
            Settings::load_with_prefix(Some(file.path()), "ECOSYSTEM_TEST_FILE").unwrap();
        assert_eq!(settings.namespace, "registry");
        assert_eq!(settings.supports_routes, Some(true));
        assert_eq!(settings.store, StoreKind::Vault);
        assert_eq!(settings.vault.address, "http://vault:8200");
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("ECOSYSTEM_TEST_ENV_NAMESPACE", "from-env");
        std::env::set_var("ECOSYSTEM_TEST_ENV_LOGGING__JSON", "true");

        let settings = Settings::load_with_prefix(None, "ECOSYSTEM_TEST_ENV").unwrap();
        assert_eq!(settings.namespace, "from-env");
        assert!(settings.logging.json);

        std::env::remove_var("ECOSYSTEM_TEST_ENV_NAMESPACE");
        std::env::remove_var("ECOSYSTEM_TEST_ENV_LOGGING__JSON");
    }

    #[test]
    fn test_invalid_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "loud".to_string();
        let err = settings.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("Log level must be one of"));
    }

    #[test]
    fn test_vault_requires_address() {
        let settings = Settings { store: StoreKind::Vault, ..Default::default() };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_file_store_requires_paths() {
        let err = Settings::default().open_secret_store().err().unwrap();
        assert!(err.to_string().contains("secrets path"));
    }

    #[test]
    fn test_missing_settings_file() {
        let path = Path::new("/nonexistent/settings.yaml");
        let err = Settings::load_with_prefix(Some(path), "ECOSYSTEM_TEST_MISSING").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_store_kind_from_str() {
        assert_eq!("Vault".parse::<StoreKind>().unwrap(), StoreKind::Vault);
        assert!("s3".parse::<StoreKind>().is_err());
    }
}
