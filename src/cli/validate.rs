//! `validate` command: run one validation pass over a request file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;

use crate::config::{Settings, StoreKind};
use crate::domain::{ConfigurationRequest, ResolvedConfiguration};
use crate::observability::log_settings_info;
use crate::services::ConfigurationResolver;

use super::output::OutputFormat;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Request document (YAML or JSON)
    #[arg(short, long)]
    pub request: PathBuf,

    /// Secret manifest file or directory; repeatable
    #[arg(short, long = "secrets")]
    pub secrets: Vec<PathBuf>,

    /// Secret store to read from
    #[arg(long, value_parser = parse_store_kind)]
    pub store: Option<StoreKind>,

    /// Namespace used when the request does not name one
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Override the platform's route capability
    #[arg(long)]
    pub supports_routes: Option<bool>,

    /// Abort the pass after this long (e.g. 30s)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

fn parse_store_kind(value: &str) -> Result<StoreKind, String> {
    value.parse::<StoreKind>().map_err(|e| e.to_string())
}

impl ValidateArgs {
    /// Fold command-line overrides into the loaded settings.
    pub fn apply_to(&self, settings: &mut Settings) {
        if !self.secrets.is_empty() {
            settings.secrets_paths = self.secrets.clone();
        }
        if let Some(store) = self.store {
            settings.store = store;
        }
        if let Some(namespace) = &self.namespace {
            settings.namespace = namespace.clone();
        }
        if self.supports_routes.is_some() {
            settings.supports_routes = self.supports_routes;
        }
    }
}

/// Load the request, open the store and resolve.
pub async fn run_validate(
    args: &ValidateArgs,
    mut settings: Settings,
) -> anyhow::Result<ResolvedConfiguration> {
    args.apply_to(&mut settings);
    settings.validate()?;
    log_settings_info(&settings);

    let text = tokio::fs::read_to_string(&args.request)
        .await
        .with_context(|| format!("Failed to read request '{}'", args.request.display()))?;
    let mut request = ConfigurationRequest::from_yaml_str(&text)?;
    if request.namespace.is_empty() {
        request.namespace = settings.namespace.clone();
    }

    let store = settings.open_secret_store()?;
    let resolver = ConfigurationResolver::new(store).with_route_support(settings.supports_routes);

    resolve_within(&resolver, &request, args.timeout).await
}

/// Run one pass, abandoning it once `limit` elapses. An expired limit is a
/// command failure and carries no [`crate::errors::Error`].
async fn resolve_within(
    resolver: &ConfigurationResolver,
    request: &ConfigurationRequest,
    limit: Option<Duration>,
) -> anyhow::Result<ResolvedConfiguration> {
    let Some(limit) = limit else {
        return Ok(resolver.resolve(request).await?);
    };
    match tokio::time::timeout(limit, resolver.resolve(request)).await {
        Ok(resolved) => Ok(resolved?),
        Err(_) => anyhow::bail!(
            "Validation pass did not finish within {}",
            humantime::format_duration(limit)
        ),
    }
}
