//! UART control over POSIX termios.
//!
//! A [`Uart`] owns one serial device descriptor and exposes baud rate, byte
//! framing, flow control, flush, read and write as validate-then-syscall
//! operations returning [`UartResult`].
//!
//! # Modules
//!
//! - `uart`: the owning handle and its operations
//! - `port`: device trait, libc and mock devices, line parameter types
//! - `error`: error taxonomy
//! - `config`: TOML configuration for the `uartctl` tool
//! - `logging`: tracing subscriber setup for the `uartctl` tool

#[cfg(not(unix))]
compile_error!("uartkit requires a POSIX target with termios");

pub mod config;
pub mod error;
pub mod logging;
pub mod port;
pub mod uart;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, UartError, UartResult};
pub use port::{
    list_ports, BaudRate, DataBits, LineSettings, MockDevice, Parity, PortInfo, PosixDevice,
    StopBits, TermiosDevice,
};
pub use uart::{CompatFlags, Uart};

pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
