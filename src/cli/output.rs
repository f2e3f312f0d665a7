//! Output formatting for CLI commands
//!
//! JSON and YAML render the full resolved configuration; `summary` prints a
//! short human-readable digest. Secret values are redacted in every format.

use anyhow::{Context, Result};
use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::domain::{BackendCredentials, DatabaseDeployment, ResolvedConfiguration};
use crate::errors::Error;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Summary,
}

/// Render a serializable value as JSON or YAML.
pub fn render<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).context("Failed to serialize to JSON")
        }
        OutputFormat::Yaml => serde_yaml::to_string(data).context("Failed to serialize to YAML"),
        OutputFormat::Summary => {
            anyhow::bail!("Summary format is only available for resolved configurations")
        }
    }
}

/// Print a resolved configuration in the requested format
pub fn print_resolved(resolved: &ResolvedConfiguration, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Summary => {
            println!("{} {}", "✔".green(), "Configuration is valid".bold());
            print!("{}", render_summary(resolved));
        }
        other => println!("{}", render(resolved, other)?),
    }
    Ok(())
}

/// Print a validation failure to stderr
pub fn print_failure(error: &Error) {
    eprintln!("{} {} ({})", "✘".red(), error.to_string().red(), error.kind());
}

/// Plain-text digest of a resolved configuration.
pub fn render_summary(resolved: &ResolvedConfiguration) -> String {
    let mut lines = Vec::new();

    lines.push(format!("  Namespace:        {}", resolved.namespace));
    lines.push(format!(
        "  Superuser:        {} <{}>{}",
        resolved.superuser.username,
        resolved.superuser.email,
        if resolved.provided.superuser { " (from secret)" } else { "" }
    ));
    let registry_db = describe_database(&resolved.registry_database.deployment);
    lines.push(format!("  Registry DB:      {}", registry_db));
    if let Some(size) = &resolved.registry_storage_size {
        lines.push(format!("  Storage volume:   {}", size));
    }
    if let Some(access_type) = resolved.external_access.access_type {
        let hostname = resolved.external_access.hostname.as_deref();
        let hostname = hostname.map(|h| format!(" ({})", h)).unwrap_or_default();
        lines.push(format!("  External access:  {}{}", access_type, hostname));
    }
    let tls = if resolved.tls.is_some() { "provided" } else { "none" };
    lines.push(format!("  TLS:              {}", tls));

    lines.push(format!("  Backends:         {}", resolved.registry_backends.len()));
    for backend in &resolved.registry_backends {
        let credentials = match &backend.credentials {
            BackendCredentials::None => "no credentials",
            BackendCredentials::Unresolved { .. } => "unresolved",
            BackendCredentials::Resolved { .. } => "credentials resolved",
        };
        lines.push(format!("    - {} [{}] {}", backend.name, backend.kind(), credentials));
    }

    lines.push(format!("  Config files:     {}", resolved.registry_config_files.len()));
    for entry in &resolved.registry_config_files {
        lines.push(format!(
            "    - {} ({}, {} bytes)",
            entry.filename,
            entry.file_type,
            entry.content.len()
        ));
    }

    if let Some(scanner) = &resolved.scanner {
        let scanner_db = describe_database(&scanner.database.deployment);
        lines.push(format!("  Scanner DB:       {}", scanner_db));
        if let Some(interval) = scanner.update_interval {
            lines.push(format!("  Scanner interval: {}", humantime::format_duration(interval)));
        }
        lines.push(format!("  Scanner files:    {}", scanner.config_files.len()));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn describe_database(deployment: &DatabaseDeployment) -> String {
    match deployment {
        DatabaseDeployment::External { server } => format!("external ({})", server),
        DatabaseDeployment::SelfManaged { volume_size: Some(size), .. } => {
            format!("self-managed, {} volume", size)
        }
        DatabaseDeployment::SelfManaged { .. } => "self-managed".to_string(),
    }
}
