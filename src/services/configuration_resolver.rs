//! Configuration resolution service
//!
//! Runs the validation checklist over a [`ConfigurationRequest`] and produces
//! a [`ResolvedConfiguration`]. Steps run in a fixed order and the first
//! failure ends the pass. Each step takes the configuration built so far by
//! value and hands back an enriched copy.

use std::sync::Arc;

use tracing::{debug, info, warn, Instrument};

use crate::domain::keys::{
    CONFIG_PASSWORD, DATABASE_NAME, DATABASE_PASSWORD, DATABASE_ROOT_PASSWORD, DATABASE_SERVER,
    DATABASE_USERNAME, MIN_SUPERUSER_PASSWORD_LENGTH, REDIS_PASSWORD, SUPERUSER_EMAIL,
    SUPERUSER_PASSWORD, SUPERUSER_USERNAME, TLS_CERTIFICATE, TLS_PRIVATE_KEY,
};
use crate::domain::request::named;
use crate::domain::{
    ConfigurationRequest, DatabaseCredentials, DatabaseDeployment, DatabaseSpec, ExternalAccessType,
    ResolvedConfiguration, ResolvedDatabase, SuperuserIdentity, TlsMaterial,
};
use crate::errors::{Error, Result};
use crate::secrets::SecretStore;
use crate::validation::{
    parse_interval, resolve_config_files, validate_backends, Quantity, RequiredKeys,
    SecretValidator,
};

/// Everything a step may read. The request is never modified.
struct PassContext<'a> {
    request: &'a ConfigurationRequest,
    namespace: &'a str,
    secrets: SecretValidator<'a>,
    supports_routes: bool,
}

/// Service resolving configuration requests against a secret store
pub struct ConfigurationResolver {
    store: Arc<dyn SecretStore>,
    route_support: Option<bool>,
}

impl ConfigurationResolver {
    /// Create a resolver reading secrets from `store`
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store, route_support: None }
    }

    /// Override the platform's route capability instead of trusting the request
    pub fn with_route_support(mut self, supports_routes: Option<bool>) -> Self {
        self.route_support = supports_routes;
        self
    }

    /// Run one validation pass.
    ///
    /// Lookups are awaited one at a time. There is no internal timeout; wrap
    /// the call in `tokio::time::timeout` to bound it.
    pub async fn resolve(&self, request: &ConfigurationRequest) -> Result<ResolvedConfiguration> {
        let span = crate::validation_span!(request.namespace, store = self.store.store_type());

        async {
            let ctx = PassContext {
                request,
                namespace: &request.namespace,
                secrets: SecretValidator::new(self.store.as_ref()),
                supports_routes: self.route_support.unwrap_or(request.platform.supports_routes),
            };

            match run_checklist(&ctx).await {
                Ok(resolved) => {
                    info!(
                        backends = resolved.registry_backends.len(),
                        config_files = resolved.registry_config_files.len(),
                        scanner = resolved.scanner.is_some(),
                        "Configuration resolved"
                    );
                    Ok(resolved)
                }
                Err(e) => {
                    warn!(
                        kind = %e.kind(),
                        entity = e.entity().unwrap_or(""),
                        error = %e,
                        "Configuration validation failed"
                    );
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

async fn run_checklist(ctx: &PassContext<'_>) -> Result<ResolvedConfiguration> {
    let resolved = ResolvedConfiguration::new(ctx.request);
    let resolved = resolve_superuser(ctx, resolved).await?;
    let resolved = check_superuser_password(resolved)?;
    let resolved = resolve_config_secret(ctx, resolved).await?;
    check_image_pull_secrets(ctx).await?;
    let resolved = resolve_cache_credentials(ctx, resolved).await?;
    let resolved = resolve_registry_database(ctx, resolved).await?;
    let resolved = parse_registry_sizes(ctx, resolved)?;
    let resolved = resolve_registry_config_files(ctx, resolved).await?;
    check_external_access(ctx)?;
    let resolved = resolve_registry_backends(ctx, resolved).await?;
    let resolved = resolve_tls(ctx, resolved).await?;
    resolve_scanner(ctx, resolved).await
}

async fn resolve_superuser(
    ctx: &PassContext<'_>,
    mut resolved: ResolvedConfiguration,
) -> Result<ResolvedConfiguration> {
    let registry = &ctx.request.registry;
    let Some(secret_name) = named(&registry.superuser_credentials_secret_name) else {
        return Ok(resolved);
    };
    if registry.skip_setup || ctx.request.status.setup_complete {
        debug!(secret = %secret_name, "Setup skipped or complete; superuser secret not read");
        return Ok(resolved);
    }

    let required = RequiredKeys::named([
        (SUPERUSER_USERNAME, "Username"),
        (SUPERUSER_PASSWORD, "Password"),
        (SUPERUSER_EMAIL, "Email"),
    ]);
    let payload = ctx.secrets.resolve(ctx.namespace, secret_name, &required).await?;

    resolved.superuser = SuperuserIdentity {
        username: payload.require_string(SUPERUSER_USERNAME)?,
        email: payload.require_string(SUPERUSER_EMAIL)?,
        password: payload.require_secret(SUPERUSER_PASSWORD)?,
    };
    resolved.provided.superuser = true;
    Ok(resolved)
}

fn check_superuser_password(resolved: ResolvedConfiguration) -> Result<ResolvedConfiguration> {
    if resolved.superuser.password.char_count() < MIN_SUPERUSER_PASSWORD_LENGTH {
        return Err(Error::validation_entity(
            format!(
                "Superuser password must be at least {} characters in length",
                MIN_SUPERUSER_PASSWORD_LENGTH
            ),
            "superuser",
        ));
    }
    Ok(resolved)
}

async fn resolve_config_secret(
    ctx: &PassContext<'_>,
    mut resolved: ResolvedConfiguration,
) -> Result<ResolvedConfiguration> {
    let Some(secret_name) = named(&ctx.request.registry.config_secret_name) else {
        return Ok(resolved);
    };

    let required = RequiredKeys::list([CONFIG_PASSWORD]);
    let payload = ctx.secrets.resolve(ctx.namespace, secret_name, &required).await?;
    resolved.config_password = Some(payload.require_secret(CONFIG_PASSWORD)?);
    resolved.provided.config_password = true;
    resolved.provided.config_password_secret_name = Some(secret_name.to_string());
    Ok(resolved)
}

async fn check_image_pull_secrets(ctx: &PassContext<'_>) -> Result<()> {
    let request = ctx.request;
    let references = [
        &request.registry.image_pull_secret_name,
        &request.cache.image_pull_secret_name,
        &request.registry.database.image_pull_secret_name,
    ];
    for secret_name in references.into_iter().filter_map(named) {
        ctx.secrets.resolve(ctx.namespace, secret_name, &RequiredKeys::Any).await?;
    }
    Ok(())
}

async fn resolve_cache_credentials(
    ctx: &PassContext<'_>,
    mut resolved: ResolvedConfiguration,
) -> Result<ResolvedConfiguration> {
    let Some(secret_name) = named(&ctx.request.cache.credentials_secret_name) else {
        return Ok(resolved);
    };

    let required = RequiredKeys::list([REDIS_PASSWORD]);
    let payload = ctx.secrets.resolve(ctx.namespace, secret_name, &required).await?;
    resolved.redis_password = Some(payload.require_secret(REDIS_PASSWORD)?);
    resolved.provided.redis = true;
    Ok(resolved)
}

async fn resolve_registry_database(
    ctx: &PassContext<'_>,
    mut resolved: ResolvedConfiguration,
) -> Result<ResolvedConfiguration> {
    if ctx.request.registry.skip_setup {
        return Ok(resolved);
    }

    let spec = &ctx.request.registry.database;
    let (database, provided) =
        resolve_database(ctx, spec, resolved.registry_database, "registry").await?;
    resolved.registry_database = database;
    resolved.provided.registry_database = provided;
    Ok(resolved)
}

/// Shared by the registry and scanner databases. Returns the database and
/// whether its credentials came from a secret.
async fn resolve_database(
    ctx: &PassContext<'_>,
    spec: &DatabaseSpec,
    current: ResolvedDatabase,
    component: &str,
) -> Result<(ResolvedDatabase, bool)> {
    let secret_name = named(&spec.credentials_secret_name);

    if let (Some(server), None) = (named(&spec.server), secret_name) {
        return Err(Error::validation_entity(
            format!(
                "The {} database names external server '{}' but no credentials secret",
                component, server
            ),
            format!("{}-database", component),
        ));
    }

    let Some(secret_name) = secret_name else {
        return Ok((current, false));
    };

    let required = RequiredKeys::list([DATABASE_USERNAME, DATABASE_PASSWORD, DATABASE_NAME]);
    let payload = ctx.secrets.resolve(ctx.namespace, secret_name, &required).await?;

    let credentials = DatabaseCredentials {
        username: Some(payload.require_string(DATABASE_USERNAME)?),
        password: Some(payload.require_secret(DATABASE_PASSWORD)?),
        database: Some(payload.require_string(DATABASE_NAME)?),
        server: payload.optional_string(DATABASE_SERVER)?,
        root_password: payload.optional_secret(DATABASE_ROOT_PASSWORD)?,
    };

    let deployment = match &credentials.server {
        Some(server) => {
            debug!(
                component = %component,
                "Database server supplied by secret; treating as external"
            );
            DatabaseDeployment::External { server: server.clone() }
        }
        None => current.deployment,
    };

    Ok((ResolvedDatabase { credentials, deployment }, true))
}

fn parse_volume_size(spec: &DatabaseSpec, database: &mut ResolvedDatabase) -> Result<()> {
    if let Some(literal) = named(&spec.volume_size) {
        let size = Quantity::parse(literal)?;
        if let DatabaseDeployment::SelfManaged { volume_size, .. } = &mut database.deployment {
            *volume_size = Some(size);
        }
    }
    Ok(())
}

fn parse_registry_sizes(
    ctx: &PassContext<'_>,
    mut resolved: ResolvedConfiguration,
) -> Result<ResolvedConfiguration> {
    let registry = &ctx.request.registry;
    parse_volume_size(&registry.database, &mut resolved.registry_database)?;

    let storage_size =
        registry.registry_storage.as_ref().and_then(|s| named(&s.persistent_volume_size));
    if let Some(literal) = storage_size {
        resolved.registry_storage_size = Some(Quantity::parse(literal)?);
    }
    Ok(resolved)
}

async fn resolve_registry_config_files(
    ctx: &PassContext<'_>,
    mut resolved: ResolvedConfiguration,
) -> Result<ResolvedConfiguration> {
    let groups = &ctx.request.registry.config_files;
    if groups.is_empty() {
        return Ok(resolved);
    }
    resolved.registry_config_files =
        resolve_config_files(&ctx.secrets, ctx.namespace, groups).await?;
    Ok(resolved)
}

fn check_external_access(ctx: &PassContext<'_>) -> Result<()> {
    let access = &ctx.request.registry.external_access;
    match access.access_type {
        Some(access_type)
            if access_type.requires_hostname() && named(&access.hostname).is_none() =>
        {
            Err(Error::validation_entity(
                format!("A hostname is required when external access type is {}", access_type),
                "externalAccess",
            ))
        }
        Some(ExternalAccessType::Route) if !ctx.supports_routes => Err(Error::validation_entity(
            "Route external access is not supported on this platform",
            "externalAccess",
        )),
        _ => Ok(()),
    }
}

async fn resolve_registry_backends(
    ctx: &PassContext<'_>,
    mut resolved: ResolvedConfiguration,
) -> Result<ResolvedConfiguration> {
    let registry = &ctx.request.registry;
    resolved.registry_backends = validate_backends(
        &ctx.secrets,
        ctx.namespace,
        &registry.registry_backends,
        registry.enable_storage_replication,
    )
    .await?;
    Ok(resolved)
}

async fn resolve_tls(
    ctx: &PassContext<'_>,
    mut resolved: ResolvedConfiguration,
) -> Result<ResolvedConfiguration> {
    let Some(secret_name) = ctx.request.registry.external_access.tls_secret_name() else {
        return Ok(resolved);
    };

    let required = RequiredKeys::list([TLS_CERTIFICATE, TLS_PRIVATE_KEY]);
    let payload = ctx.secrets.resolve(ctx.namespace, secret_name, &required).await?;
    resolved.tls = Some(TlsMaterial {
        certificate: payload.require_bytes(TLS_CERTIFICATE)?,
        private_key: payload.require_bytes(TLS_PRIVATE_KEY)?,
    });
    Ok(resolved)
}

async fn resolve_scanner(
    ctx: &PassContext<'_>,
    mut resolved: ResolvedConfiguration,
) -> Result<ResolvedConfiguration> {
    let (Some(spec), Some(mut scanner)) = (ctx.request.enabled_scanner(), resolved.scanner.take())
    else {
        return Ok(resolved);
    };

    if let Some(secret_name) = named(&spec.image_pull_secret_name) {
        ctx.secrets.resolve(ctx.namespace, secret_name, &RequiredKeys::Any).await?;
    }

    if let Some(literal) = named(&spec.update_interval) {
        scanner.update_interval = Some(parse_interval(literal)?);
    }

    // Scanner database credentials are checked even when registry setup is skipped.
    let (mut database, provided) =
        resolve_database(ctx, &spec.database, scanner.database, "scanner").await?;
    parse_volume_size(&spec.database, &mut database)?;
    scanner.database = database;
    resolved.provided.scanner_database = provided;

    if !spec.config_files.is_empty() {
        scanner.config_files =
            resolve_config_files(&ctx.secrets, ctx.namespace, &spec.config_files).await?;
    }

    resolved.scanner = Some(scanner);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SuperuserCredentials;
    use crate::errors::ErrorKind;
    use crate::secrets::InMemorySecretStore;
    use tracing_test::traced_test;

    fn request() -> ConfigurationRequest {
        let mut request = ConfigurationRequest::new("quay");
        request.registry.superuser =
            SuperuserCredentials::new("admin", "password123", "admin@example.com");
        request
    }

    #[tokio::test]
    async fn test_minimal_request_resolves() {
        let resolver = ConfigurationResolver::new(Arc::new(InMemorySecretStore::new()));
        let resolved = resolver.resolve(&request()).await.unwrap();
        assert_eq!(resolved.superuser.username, "admin");
        assert!(!resolved.provided.superuser);
        assert!(resolved.registry_backends.is_empty());
    }

    #[tokio::test]
    async fn test_superuser_secret_ignored_once_setup_complete() {
        let mut request = request();
        request.registry.superuser_credentials_secret_name = Some("absent".to_string());
        request.status.setup_complete = true;

        let store = Arc::new(InMemorySecretStore::new());
        let resolver = ConfigurationResolver::new(store.clone());
        let resolved = resolver.resolve(&request).await.unwrap();
        assert!(!resolved.provided.superuser);
        assert_eq!(store.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_route_override_beats_request_flag() {
        let mut request = request();
        request.registry.external_access.access_type = Some(ExternalAccessType::Route);
        request.platform.supports_routes = true;

        let resolver = ConfigurationResolver::new(Arc::new(InMemorySecretStore::new()))
            .with_route_support(Some(false));
        let err = resolver.resolve(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.entity(), Some("externalAccess"));
    }

    #[test]
    fn test_password_length_counts_characters() {
        let mut resolved = ResolvedConfiguration::new(&request());
        resolved.superuser.password = "pässwörd".into();
        assert!(check_superuser_password(resolved).is_ok());
    }

    #[traced_test]
    #[tokio::test]
    async fn test_pass_logs_never_carry_secret_values() {
        let store = InMemorySecretStore::new()
            .with_secret("quay", "redis", [("password", "redis-hunter2")]);
        let mut request = request();
        request.cache.credentials_secret_name = Some("redis".to_string());
        request.registry.config_secret_name = Some("absent-config".to_string());

        let resolver = ConfigurationResolver::new(Arc::new(store));
        assert!(resolver.resolve(&request).await.is_err());

        request.registry.config_secret_name = None;
        assert!(resolver.resolve(&request).await.is_ok());

        assert!(logs_contain("Secret lookup failed"));
        assert!(logs_contain("absent-config"));
        assert!(logs_contain("Configuration resolved"));
        assert!(logs_contain("validation_pass"));
        assert!(!logs_contain("redis-hunter2"));
        assert!(!logs_contain("password123"));
    }
}
