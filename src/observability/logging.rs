//! # Structured Logging
//!
//! Logging is built on `tracing`. [`init_logging`] installs a
//! `tracing-subscriber` formatter filtered by `RUST_LOG` (falling back to the
//! configured level), writing human-readable or JSON lines to stderr so that
//! stdout stays free for command output.

use tracing_subscriber::EnvFilter;

use crate::config::{LoggingSettings, Settings};
use crate::errors::Result;

/// Create the span a validation pass runs in.
///
/// ```rust,ignore
/// let span = validation_span!("quay-enterprise");
/// let span = validation_span!("quay-enterprise", store = "vault");
/// ```
#[macro_export]
macro_rules! validation_span {
    ($namespace:expr) => {
        tracing::info_span!(
            "validation_pass",
            namespace = %$namespace,
            pass_id = %uuid::Uuid::new_v4()
        )
    };
    ($namespace:expr, $($field:tt)*) => {
        tracing::info_span!(
            "validation_pass",
            namespace = %$namespace,
            pass_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global subscriber.
///
/// A subscriber that is already installed (e.g. by a test harness) is left
/// in place.
pub fn init_logging(settings: &LoggingSettings, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { settings.level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed = if settings.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.with_target(false).try_init()
    };

    if installed.is_err() {
        tracing::debug!("Global subscriber already installed; keeping it");
    }
    Ok(())
}

/// Log the effective settings at startup. Tokens are never logged.
pub fn log_settings_info(settings: &Settings) {
    tracing::info!(
        namespace = %settings.namespace,
        store = ?settings.store,
        secrets_paths = settings.secrets_paths.len(),
        vault_address = %settings.vault.address,
        vault_token_set = settings.vault.token.is_some(),
        supports_routes = ?settings.supports_routes,
        "Resolver settings"
    );
}
