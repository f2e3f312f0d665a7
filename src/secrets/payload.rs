//! Secret payloads as returned by a [`SecretStore`](super::SecretStore).

use std::collections::BTreeMap;
use std::fmt;

use super::types::{SecretBytes, SecretString};
use crate::errors::{Error, Result};

/// Contents of one secret: key name to raw bytes.
///
/// Keys are unique and iterate in sorted order, so anything derived from a
/// payload (for example config files enumerated from it) is deterministic.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretPayload {
    namespace: String,
    name: String,
    data: BTreeMap<String, Vec<u8>>,
}

impl SecretPayload {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), name: name.into(), data: BTreeMap::new() }
    }

    /// Build a payload from key/value pairs.
    pub fn from_entries<K, V, I>(
        namespace: impl Into<String>,
        name: impl Into<String>,
        entries: I,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut payload = Self::new(namespace, name);
        for (key, value) in entries {
            payload.insert(key, value);
        }
        payload
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.data.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes stored under `key`, failing with [`Error::MissingKey`] when absent.
    pub fn require(&self, key: &str) -> Result<&[u8]> {
        self.get(key).ok_or_else(|| Error::missing_key(&self.namespace, &self.name, key))
    }

    /// UTF-8 text stored under `key`.
    pub fn require_string(&self, key: &str) -> Result<String> {
        let bytes = self.require(key)?;
        self.decode(key, bytes)
    }

    /// UTF-8 text stored under `key`, wrapped for redaction.
    pub fn require_secret(&self, key: &str) -> Result<SecretString> {
        self.require_string(key).map(SecretString::new)
    }

    /// Raw bytes stored under `key`, wrapped for redaction.
    pub fn require_bytes(&self, key: &str) -> Result<SecretBytes> {
        self.require(key).map(SecretBytes::from)
    }

    /// UTF-8 text under `key` if the key is present.
    pub fn optional_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            Some(bytes) => self.decode(key, bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Redacted text under `key` if the key is present.
    pub fn optional_secret(&self, key: &str) -> Result<Option<SecretString>> {
        Ok(self.optional_string(key)?.map(SecretString::new))
    }

    fn decode(&self, key: &str, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|_| {
            Error::validation_entity(
                format!(
                    "Key '{}' in secret {}/{} is not valid UTF-8",
                    key, self.namespace, self.name
                ),
                self.name.clone(),
            )
        })
    }
}

impl fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPayload")
            .field("namespace", &self.namespace)
            .field("name", &self.name)
            .field("keys", &self.data.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn payload() -> SecretPayload {
        SecretPayload::from_entries(
            "quay",
            "db-creds",
            [("database-username", "quay"), ("database-password", "s3cr3t-pw")],
        )
    }

    #[test]
    fn test_keys_are_sorted() {
        let binding = payload();
        let keys: Vec<&str> = binding.keys().collect();
        assert_eq!(keys, vec!["database-password", "database-username"]);
    }

    #[test]
    fn test_require_missing_key_names_secret() {
        let err = payload().require("database-name").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingKey);
        assert!(err.to_string().contains("db-creds"));
        assert!(err.to_string().contains("database-name"));
    }

    #[test]
    fn test_optional_string() {
        let payload = payload();
        assert_eq!(payload.optional_string("database-username").unwrap(), Some("quay".to_string()));
        assert_eq!(payload.optional_string("database-server").unwrap(), None);
    }

    #[test]
    fn test_non_utf8_text_is_rejected() {
        let mut payload = payload();
        payload.insert("database-name", vec![0xff, 0xfe]);
        let err = payload.require_string("database-name").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        // Raw byte access still works.
        assert_eq!(payload.require("database-name").unwrap(), &[0xff, 0xfe]);
    }

    #[test]
    fn test_debug_hides_values() {
        let debug = format!("{:?}", payload());
        assert!(debug.contains("database-password"));
        assert!(!debug.contains("s3cr3t-pw"));
    }
}
