//! Tracing subscriber setup.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Build the filter for `level`. `RUST_LOG` takes precedence when set.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(level)?),
    }
}

/// Install a global fmt subscriber at `level`.
///
/// Fails if a global subscriber is already installed.
pub fn init(level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level)?)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

/// Install a global fmt subscriber using the configured level.
pub fn init_from_config(config: &Config) -> Result<()> {
    init(&config.logging.level)
}
