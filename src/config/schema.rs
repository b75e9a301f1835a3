//! Configuration schema definitions.
//!
//! This module defines the structure of the configuration file using serde.
//! All configuration sections are defined here with appropriate defaults.

use super::error::{ConfigError, ConfigResult};
use crate::error::UartError;
use crate::port::{BaudRate, DataBits, LineSettings, Parity, StopBits};
use crate::uart::CompatFlags;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device and line settings
    pub device: DeviceConfig,
    /// Compatibility switches
    pub compat: CompatFlags,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Check every value that has a restricted range.
    pub fn validate(&self) -> ConfigResult<()> {
        self.device.line_settings().map(|_| ())?;
        if self.device.path.trim().is_empty() {
            return Err(ConfigError::invalid_setting(
                "device.path",
                UartError::invalid("device path is empty"),
            ));
        }
        if self.device.read_chunk == 0 {
            return Err(ConfigError::invalid_setting(
                "device.read_chunk",
                UartError::invalid("read buffer must hold at least 1 byte"),
            ));
        }
        Ok(())
    }
}

/// Device configuration section.
///
/// Numeric fields are kept as plain integers so out-of-range values surface
/// as validation errors naming the key instead of TOML parse errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device path
    pub path: String,
    /// Line speed in bit/s; must be one of the standard rates
    pub baud: u32,
    /// Character size, 5 through 8
    pub data_bits: i32,
    /// Parity: "none", "odd" or "even"
    pub parity: Parity,
    /// Stop bits, 1 or 2
    pub stop_bits: i32,
    /// XON/XOFF software flow control
    pub xonxoff: bool,
    /// RTS/CTS hardware flow control
    pub rtscts: bool,
    /// Buffer size used by `uartctl read`
    pub read_chunk: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: "/dev/ttyS0".to_string(),
            baud: 115200,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: 1,
            xonxoff: false,
            rtscts: false,
            read_chunk: 256,
        }
    }
}

impl DeviceConfig {
    /// Convert to typed line settings, naming the offending key on failure.
    pub fn line_settings(&self) -> ConfigResult<LineSettings> {
        let baud_rate = BaudRate::try_from(self.baud)
            .map_err(|e| ConfigError::invalid_setting("device.baud", e))?;
        let data_bits = DataBits::try_from(self.data_bits)
            .map_err(|e| ConfigError::invalid_setting("device.data_bits", e))?;
        let stop_bits = StopBits::try_from(self.stop_bits)
            .map_err(|e| ConfigError::invalid_setting("device.stop_bits", e))?;

        Ok(LineSettings {
            baud_rate: Some(baud_rate),
            data_bits,
            parity: self.parity,
            stop_bits,
            xonxoff: self.xonxoff,
            rtscts: self.rtscts,
        })
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    Pretty,
    /// Compact format
    #[default]
    Compact,
}
