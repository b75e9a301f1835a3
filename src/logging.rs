//! Tracing subscriber setup for the `uartctl` binary.
//!
//! The library only emits events; installing a subscriber is left to the
//! application.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber writing to stderr.
///
/// `RUST_LOG` wins over the configured level. Each `-v` raises the default
/// to `debug`, then `trace`.
pub fn init(
    config: &LoggingConfig,
    verbosity: u8,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let default_directive = match verbosity {
        0 => config.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    }
}
