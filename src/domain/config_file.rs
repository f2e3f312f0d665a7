//! Config-file groups and the entries resolved from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::secrets::SecretBytes;

/// What a config file is used for once mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigFileType {
    /// Regular configuration file (global default)
    #[default]
    Config,
    /// Additional CA certificate to trust
    ExtraCaCert,
}

impl fmt::Display for ConfigFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFileType::Config => write!(f, "config"),
            ConfigFileType::ExtraCaCert => write!(f, "extraCaCert"),
        }
    }
}

/// A set of config files sourced from one secret.
///
/// With no `files`, every key of the secret becomes a file. With `files`,
/// only the listed keys are used and each must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFileGroup {
    #[serde(default)]
    pub secret_name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<ConfigFileRequest>,

    /// Group-level default type
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<ConfigFileType>,
}

impl ConfigFileGroup {
    /// Group that takes every key of `secret_name`.
    pub fn all_keys(secret_name: impl Into<String>) -> Self {
        Self { secret_name: secret_name.into(), ..Default::default() }
    }

    pub fn with_type(mut self, file_type: ConfigFileType) -> Self {
        self.file_type = Some(file_type);
        self
    }

    pub fn with_file(mut self, file: ConfigFileRequest) -> Self {
        self.files.push(file);
        self
    }

    /// True when an explicit file list was supplied.
    pub fn has_explicit_files(&self) -> bool {
        !self.files.is_empty()
    }
}

/// One explicitly selected key of a config-file group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFileRequest {
    pub key: String,

    /// Output filename; the key is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<ConfigFileType>,
}

impl ConfigFileRequest {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), ..Default::default() }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_type(mut self, file_type: ConfigFileType) -> Self {
        self.file_type = Some(file_type);
        self
    }
}

/// A config file ready to be mounted. Only produced by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFileEntry {
    #[serde(rename = "type")]
    pub file_type: ConfigFileType,
    pub key: String,
    pub filename: String,
    pub content: SecretBytes,
}
