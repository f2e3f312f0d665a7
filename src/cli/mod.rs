//! # Command Line Interface
//!
//! `validate` runs a single validation pass over a request document and
//! prints the resolved configuration; `settings` shows the effective settings.

pub mod output;
pub mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::errors::Error;
use crate::observability::init_logging;

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "ecosystem-config")]
#[command(about = "Validate and resolve registry ecosystem configuration against a secret store")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (YAML, TOML or JSON)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a request and print the resolved configuration
    Validate(validate::ValidateArgs),

    /// Show the effective settings
    Settings {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.settings.as_deref())?;
    init_logging(&settings.logging, cli.verbose)?;

    match cli.command {
        Commands::Validate(args) => match validate::run_validate(&args, settings).await {
            Ok(resolved) => output::print_resolved(&resolved, args.output)?,
            Err(e) => {
                if let Some(error) = e.downcast_ref::<Error>() {
                    output::print_failure(error);
                    anyhow::bail!("validation failed");
                }
                return Err(e);
            }
        },
        Commands::Settings { output } => {
            let format = if output == OutputFormat::Summary { OutputFormat::Yaml } else { output };
            println!("{}", output::render(&settings, format)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "ecosystem-config",
            "validate",
            "-r",
            "req.yaml",
            "--verbose",
            "--settings",
            "s.yaml",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.settings, Some(PathBuf::from("s.yaml")));
        assert!(matches!(cli.command, Commands::Validate(_)));
    }
}
