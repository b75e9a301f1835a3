//! Errors raised while loading `uartkit.toml`.

use crate::error::UartError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the schema.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is outside what the device layer accepts.
    #[error("Invalid value for '{key}': {source}")]
    InvalidSetting {
        key: &'static str,
        #[source]
        source: UartError,
    },

    /// An override variable could not be parsed.
    #[error("Failed to parse environment variable '{var}': {message}")]
    EnvParse { var: String, message: String },
}

impl ConfigError {
    /// Attach the configuration key to a rejected value.
    pub fn invalid_setting(key: &'static str, source: UartError) -> Self {
        Self::InvalidSetting { key, source }
    }

    /// The configuration key at fault, if the error concerns a single value.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::InvalidSetting { key, .. } => Some(*key),
            _ => None,
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
