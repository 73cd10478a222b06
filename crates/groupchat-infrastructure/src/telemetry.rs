//! Tracing subscriber setup.

use groupchat_core::error::{ChatError, Result};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides `config.level` when set.
///
/// # Errors
///
/// Returns `ChatError::Config` if the level directive does not parse or a
/// global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| ChatError::config(format!("Invalid log level '{}': {}", config.level, e)))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| ChatError::config(format!("Failed to install tracing subscriber: {}", e)))
}
