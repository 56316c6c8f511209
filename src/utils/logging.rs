//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` formatter writing to stderr so that stdout only
//! ever carries answers. `RUST_LOG` takes precedence over the configured level.

use crate::config::LoggingConfig;
use crate::error::{DecodeError, Result};
use std::io::IsTerminal;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber described by `config`.
///
/// # Errors
/// Returns `DecodeError::ConfigError` if a global subscriber is already installed
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false);

    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| DecodeError::ConfigError(format!("Failed to initialise logging: {e}")))?;
    tracing::debug!(app = %config.app_name, level = %config.log_level, "Logging initialised");
    Ok(())
}
