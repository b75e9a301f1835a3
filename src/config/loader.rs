//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "UARTKIT";

/// Config file name
const CONFIG_FILE_NAME: &str = "uartkit.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "UARTKIT_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `UARTKIT_CONFIG` environment variable (explicit path)
    /// 2. `./uartkit.toml` (current directory)
    /// 3. `uartkit.toml` in the platform config directory
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables override file values. The result is validated.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Config::default(),
        };

        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self { config_path, config })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> Self {
        let mut config = Config::default();
        // Still apply env overrides even with defaults
        if apply_env_overrides(&mut config).is_err() {
            config = Config::default();
        }

        Self {
            config_path: None,
            config,
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    get_default_config_path().filter(|path| path.exists())
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(toml::from_str(&content)?)
}

/// Apply environment variable overrides to the configuration.
///
/// Environment variables follow the pattern `UARTKIT_<SECTION>_<KEY>`.
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_DEVICE_PATH")) {
        config.device.path = val;
    }
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_DEVICE_BAUD")) {
        config.device.baud = val.parse().map_err(|e| ConfigError::EnvParse {
            var: format!("{ENV_PREFIX}_DEVICE_BAUD"),
            message: format!("'{val}' is not a number: {e}"),
        })?;
    }
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_LOGGING_LEVEL")) {
        config.logging.level = val;
    }

    Ok(())
}

/// Get the default config directory for creating new config files.
pub fn get_default_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "uartkit").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the default config file path for creating new config files.
pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}
