//! Configuration management for RemoteFS.
//!
//! This module provides TOML-based configuration file loading and saving.
//! The default configuration path is `~/.config/remotefs/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use protocol::ServerDescriptor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("server.host must not be empty")]
    EmptyHost,

    #[error("server.port must be greater than 0")]
    InvalidPort,

    #[error("server.home must be an absolute path, got {0:?}")]
    RelativeHome(String),

    #[error("chroot.root must be an absolute path, got {0:?}")]
    RelativeRoot(String),

    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Remote server the connection is opened against.
    pub server: ServerDescriptor,

    /// Confinement settings.
    pub chroot: ChrootConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    pub level: String,
}

/// Confinement configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ChrootConfig {
    /// Absolute chroot root. Defaults to the server home directory.
    pub root: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("remotefs")
        .join("config.toml")
}

impl Config {
    /// Chroot root items default to: the configured root, else the server home.
    pub fn effective_root(&self) -> &str {
        match &self.chroot.root {
            Some(root) if !root.is_empty() => root.as_str(),
            _ => self.server.home(),
        }
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables take precedence over config file values.
    /// Supported variables:
    /// - REMOTEFS_LOG_LEVEL: Override log level (trace, debug, info, warn, error)
    /// - REMOTEFS_CHROOT_ROOT: Override the chroot root
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("REMOTEFS_LOG_LEVEL") {
            if !level.is_empty() {
                tracing::info!("Overriding log level from environment: {}", level);
                self.logging.level = level;
            }
        }

        if let Ok(root) = std::env::var("REMOTEFS_CHROOT_ROOT") {
            if !root.is_empty() {
                tracing::info!("Overriding chroot root from environment: {}", root);
                self.chroot.root = Some(root);
            }
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() && self.server.ip.is_none() {
            return Err(ConfigError::EmptyHost);
        }

        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if !self.server.home.starts_with('/') {
            return Err(ConfigError::RelativeHome(self.server.home.clone()));
        }

        if let Some(root) = &self.chroot.root {
            if !root.starts_with('/') {
                return Err(ConfigError::RelativeRoot(root.clone()));
            }
        }

        let level = self.logging.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.logging.level.clone()));
        }

        Ok(())
    }

    /// Load configuration from a file.
    ///
    /// If the file does not exist, returns the default configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Save configuration to a file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}
