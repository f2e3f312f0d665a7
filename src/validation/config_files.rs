//! Config-file resolution from secret payloads.

use tracing::debug;

use super::secrets::{RequiredKeys, SecretValidator};
use crate::domain::{ConfigFileEntry, ConfigFileGroup, ConfigFileType};
use crate::errors::{Error, Result};

/// Resolve `groups` into config-file entries.
///
/// Entries come out in group order, then in entry order within a group. A
/// group without an explicit file list contributes every key of its secret in
/// key order.
///
/// Type resolution cascades: entry type, then group type, then
/// [`ConfigFileType::Config`].
pub async fn resolve_config_files(
    secrets: &SecretValidator<'_>,
    namespace: &str,
    groups: &[ConfigFileGroup],
) -> Result<Vec<ConfigFileEntry>> {
    let mut entries = Vec::new();

    for group in groups {
        if group.secret_name.is_empty() {
            return Err(Error::validation("Config file group must reference a secret"));
        }

        let group_type = group.file_type.unwrap_or_default();

        if !group.has_explicit_files() {
            let payload = secrets.resolve(namespace, &group.secret_name, &RequiredKeys::Any).await?;
            for (key, content) in payload.iter() {
                entries.push(ConfigFileEntry {
                    file_type: group_type,
                    key: key.to_string(),
                    filename: key.to_string(),
                    content: content.into(),
                });
            }
            debug!(
                secret = %group.secret_name,
                files = payload.len(),
                "Resolved config files from all keys"
            );
            continue;
        }

        let required = RequiredKeys::list(group.files.iter().map(|file| file.key.as_str()));
        let payload = secrets.resolve(namespace, &group.secret_name, &required).await?;

        for file in &group.files {
            entries.push(ConfigFileEntry {
                file_type: file.file_type.or(group.file_type).unwrap_or(ConfigFileType::Config),
                key: file.key.clone(),
                filename: file
                    .filename
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| file.key.clone()),
                content: payload.require_bytes(&file.key)?,
            });
        }
        debug!(
            secret = %group.secret_name,
            files = group.files.len(),
            "Resolved explicit config files"
        );
    }

    Ok(entries)
}
