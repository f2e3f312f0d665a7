//! Per-variant rules for registry storage backends.
//!
//! Each non-local variant names its location field, the credential keys its
//! secret must hold, any optional keys, and how a resolved secret becomes
//! [`StorageCredentials`].

use tracing::debug;

use super::secrets::{RequiredKeys, SecretValidator};
use crate::domain::keys::{
    ACCESS_KEY, AZURE_ACCOUNT_KEY, AZURE_ACCOUNT_NAME, AZURE_SAS_TOKEN, SECRET_KEY, SWIFT_PASSWORD,
    SWIFT_USER,
};
use crate::domain::{BackendCredentials, BackendKind, RegistryBackend, StorageCredentials};
use crate::errors::{Error, Result};
use crate::secrets::SecretPayload;

/// Structural and credential rules for one backend kind.
pub struct VariantRules {
    pub kind: BackendKind,
    pub location_field: &'static str,
    pub required_keys: &'static [&'static str],
    pub optional_keys: &'static [&'static str],
    project: fn(&SecretPayload) -> Result<StorageCredentials>,
}

impl VariantRules {
    /// Materialize credentials from a secret that passed the key check.
    pub fn project(&self, payload: &SecretPayload) -> Result<StorageCredentials> {
        (self.project)(payload)
    }

    /// Whether inline credentials have the shape this kind expects.
    fn accepts(&self, credentials: &StorageCredentials) -> bool {
        match self.kind {
            BackendKind::Azure => matches!(credentials, StorageCredentials::Azure { .. }),
            BackendKind::Swift => matches!(credentials, StorageCredentials::Swift { .. }),
            BackendKind::Local => false,
            _ => matches!(credentials, StorageCredentials::AccessKey { .. }),
        }
    }
}

fn project_access_key(payload: &SecretPayload) -> Result<StorageCredentials> {
    Ok(StorageCredentials::AccessKey {
        access_key: payload.require_secret(ACCESS_KEY)?,
        secret_key: payload.require_secret(SECRET_KEY)?,
    })
}

fn project_azure(payload: &SecretPayload) -> Result<StorageCredentials> {
    Ok(StorageCredentials::Azure {
        account_name: payload.require_string(AZURE_ACCOUNT_NAME)?,
        account_key: payload.require_secret(AZURE_ACCOUNT_KEY)?,
        sas_token: payload.optional_secret(AZURE_SAS_TOKEN)?,
    })
}

fn project_swift(payload: &SecretPayload) -> Result<StorageCredentials> {
    Ok(StorageCredentials::Swift {
        user: payload.require_string(SWIFT_USER)?,
        password: payload.require_secret(SWIFT_PASSWORD)?,
    })
}

const ACCESS_KEY_PAIR: &[&str] = &[ACCESS_KEY, SECRET_KEY];

static VARIANT_RULES: &[VariantRules] = &[
    VariantRules {
        kind: BackendKind::S3,
        location_field: "bucketName",
        required_keys: ACCESS_KEY_PAIR,
        optional_keys: &[],
        project: project_access_key,
    },
    VariantRules {
        kind: BackendKind::Azure,
        location_field: "containerName",
        required_keys: &[AZURE_ACCOUNT_NAME, AZURE_ACCOUNT_KEY],
        optional_keys: &[AZURE_SAS_TOKEN],
        project: project_azure,
    },
    VariantRules {
        kind: BackendKind::GoogleCloud,
        location_field: "bucketName",
        required_keys: ACCESS_KEY_PAIR,
        optional_keys: &[],
        project: project_access_key,
    },
    VariantRules {
        kind: BackendKind::Rhocs,
        location_field: "bucketName",
        required_keys: ACCESS_KEY_PAIR,
        optional_keys: &[],
        project: project_access_key,
    },
    VariantRules {
        kind: BackendKind::Rados,
        location_field: "bucketName",
        required_keys: ACCESS_KEY_PAIR,
        optional_keys: &[],
        project: project_access_key,
    },
    VariantRules {
        kind: BackendKind::Swift,
        location_field: "container",
        required_keys: &[SWIFT_USER, SWIFT_PASSWORD],
        optional_keys: &[],
        project: project_swift,
    },
    VariantRules {
        kind: BackendKind::CloudfrontS3,
        location_field: "bucketName",
        required_keys: ACCESS_KEY_PAIR,
        optional_keys: &[],
        project: project_access_key,
    },
];

/// Rules for `kind`; `None` for local storage.
pub fn rules_for(kind: BackendKind) -> Option<&'static VariantRules> {
    VARIANT_RULES.iter().find(|rules| rules.kind == kind)
}

/// Validate one declared backend, returning a copy with credentials resolved.
pub async fn validate_backend(
    secrets: &SecretValidator<'_>,
    namespace: &str,
    backend: &RegistryBackend,
    replication_enabled: bool,
) -> Result<RegistryBackend> {
    let kind = backend.kind();

    if kind == BackendKind::Local && replication_enabled {
        return Err(Error::invalid_combination(
            format!(
                "Local storage backend '{}' cannot be used when storage replication is enabled",
                backend.name
            ),
            backend.name.clone(),
        ));
    }

    let mut resolved = backend.clone();

    let Some(rules) = rules_for(kind) else {
        return Ok(resolved);
    };

    match &backend.credentials {
        BackendCredentials::Unresolved { secret_name } => {
            let required = RequiredKeys::list(rules.required_keys.iter().copied());
            let payload = secrets.resolve(namespace, secret_name, &required).await?;
            let credentials = rules.project(&payload)?;
            debug!(
                backend = %backend.name,
                kind = %kind,
                secret = %secret_name,
                "Resolved backend credentials"
            );
            resolved.credentials = BackendCredentials::Resolved { credentials };
        }
        BackendCredentials::Resolved { credentials } if !rules.accepts(credentials) => {
            return Err(Error::validation_entity(
                format!(
                    "Backend '{}' of kind {} cannot use {} credentials",
                    backend.name,
                    kind,
                    credentials.shape()
                ),
                backend.name.clone(),
            ));
        }
        _ => {}
    }

    if resolved.storage.storage_path().is_empty() {
        return Err(Error::validation_entity(
            format!("Backend '{}' of kind {} requires storagePath", backend.name, kind),
            backend.name.clone(),
        ));
    }
    if resolved.storage.location().unwrap_or_default().is_empty() {
        return Err(Error::validation_entity(
            format!(
                "Backend '{}' of kind {} requires {}",
                backend.name, kind, rules.location_field
            ),
            backend.name.clone(),
        ));
    }

    Ok(resolved)
}

/// Validate every declared backend in order.
pub async fn validate_backends(
    secrets: &SecretValidator<'_>,
    namespace: &str,
    backends: &[RegistryBackend],
    replication_enabled: bool,
) -> Result<Vec<RegistryBackend>> {
    let mut resolved = Vec::with_capacity(backends.len());
    for backend in backends {
        resolved.push(validate_backend(secrets, namespace, backend, replication_enabled).await?);
    }
    Ok(resolved)
}
