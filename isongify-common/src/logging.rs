//! Tracing subscriber setup

use crate::config::LoggingConfig;
use crate::Result;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Build the filter for a logging config
///
/// `RUST_LOG` wins when set; otherwise the configured level applies.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global fmt subscriber
///
/// Logs go to stderr, or are appended to `config.file` when set. Returns
/// `Ok(false)` if a global subscriber was already installed (tests call this
/// repeatedly).
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(config));

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok()
        }
        None => builder.with_writer(std::io::stderr).try_init().is_ok(),
    };

    Ok(installed)
}
