//! Error taxonomy for UART operations.
//!
//! Every operation returns [`UartResult`]. Failures fall into three kinds,
//! exposed through [`UartError::kind`] for callers that only care about the
//! category and not the underlying cause.

use std::fmt;
use std::io;
use thiserror::Error;

/// A specialized `Result` type for UART operations.
pub type UartResult<T> = Result<T, UartError>;

/// Coarse classification of a [`UartError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A bad or missing argument, or an operation on a stopped handle.
    InvalidParameter,
    /// The feature is compiled out or the device refused the request.
    NotSupported,
    /// The underlying system call failed.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidParameter => "invalid parameter",
            Self::NotSupported => "not supported",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while controlling a UART device.
#[derive(Debug, Error)]
pub enum UartError {
    /// An argument was outside its accepted range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The handle has already been stopped.
    #[error("UART handle is closed")]
    Closed,

    /// Terminal attribute control is not available.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Opening the device failed.
    #[error("Failed to open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A system call failed.
    #[error("{op} failed: {source}")]
    Syscall {
        op: &'static str,
        #[source]
        source: io::Error,
    },
}

impl UartError {
    /// Create an InvalidParameter error from a message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Create a NotSupported error from a message.
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported(message.into())
    }

    /// Wrap a failed system call.
    pub fn syscall(op: &'static str, source: io::Error) -> Self {
        Self::Syscall { op, source }
    }

    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter(_) | Self::Closed => ErrorKind::InvalidParameter,
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::Open { .. } | Self::Syscall { .. } => ErrorKind::Unknown,
        }
    }

    /// The OS error behind this failure, if there is one.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Open { source, .. } | Self::Syscall { source, .. } => Some(source),
            _ => None,
        }
    }
}
