//! Configuration for the `uartctl` tool.
//!
//! TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the first of these that exists:
//!
//! 1. `UARTKIT_CONFIG` environment variable (explicit path)
//! 2. `./uartkit.toml` (current directory)
//! 3. `uartkit.toml` in the platform config directory
//!    (`~/.config/uartkit/` on Linux, `~/Library/Application Support/uartkit/` on macOS)
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! - `UARTKIT_DEVICE_PATH=/dev/ttyUSB1`
//! - `UARTKIT_DEVICE_BAUD=9600`
//! - `UARTKIT_LOGGING_LEVEL=debug`
//!
//! # Example
//!
//! ```toml
//! [device]
//! path = "/dev/ttyAMA0"
//! baud = 115200
//! data_bits = 8
//! parity = "none"
//! stop_bits = 1
//! rtscts = true
//!
//! [compat]
//! reject_two_stop_bits = false
//!
//! [logging]
//! level = "debug"
//! format = "compact"
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader};
pub use schema::{Config, DeviceConfig, LogFormat, LoggingConfig};
