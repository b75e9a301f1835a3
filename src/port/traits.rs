//! Core traits and line parameter types.
//!
//! Defines the `TermiosDevice` trait that sits between the UART handle and
//! the operating system, so the real descriptor-backed device and the mock
//! can be used interchangeably.

use super::baud::BaudRate;
use crate::error::{UartError, UartResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::str::FromStr;

/// Trait for the system calls a UART handle forwards to.
///
/// Implementations perform exactly one system call per method and report
/// failures as raw `io::Error`s; validation and error classification live in
/// the handle.
pub trait TermiosDevice: Send + fmt::Debug {
    /// Get the path this device was opened from.
    fn name(&self) -> &str;

    /// Fetch the current terminal attributes (`tcgetattr`).
    fn get_attributes(&self) -> io::Result<libc::termios>;

    /// Apply terminal attributes immediately (`tcsetattr` with `TCSANOW`).
    fn set_attributes(&mut self, attrs: &libc::termios) -> io::Result<()>;

    /// Discard both the input and the output queue (`tcflush` with `TCIOFLUSH`).
    fn flush_queues(&mut self) -> io::Result<()>;

    /// Read bytes into `buffer`, blocking according to the descriptor's mode.
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize>;

    /// Write bytes from `buffer`, returning how many were accepted.
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize>;
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl DataBits {
    /// The `CSIZE` field value for this character size.
    pub fn csize(self) -> libc::tcflag_t {
        match self {
            Self::Five => libc::CS5,
            Self::Six => libc::CS6,
            Self::Seven => libc::CS7,
            Self::Eight => libc::CS8,
        }
    }

    /// Decode the character size from a `c_cflag` value.
    pub fn from_cflag(cflag: libc::tcflag_t) -> Self {
        match cflag & libc::CSIZE {
            libc::CS5 => Self::Five,
            libc::CS6 => Self::Six,
            libc::CS7 => Self::Seven,
            _ => Self::Eight,
        }
    }
}

impl TryFrom<i32> for DataBits {
    type Error = UartError;

    fn try_from(bits: i32) -> UartResult<Self> {
        match bits {
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            other => Err(UartError::invalid(format!(
                "data bits must be between 5 and 8, got {other}"
            ))),
        }
    }
}

impl TryFrom<u8> for DataBits {
    type Error = UartError;

    fn try_from(bits: u8) -> UartResult<Self> {
        Self::try_from(i32::from(bits))
    }
}

impl From<DataBits> for u8 {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

/// Parity checking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl Parity {
    /// Decode parity from `PARENB`/`PARODD` in a `c_cflag` value.
    pub fn from_cflag(cflag: libc::tcflag_t) -> Self {
        if cflag & libc::PARENB == 0 {
            Self::None
        } else if cflag & libc::PARODD != 0 {
            Self::Odd
        } else {
            Self::Even
        }
    }
}

/// Numeric parity codes: 0 = none, 1 = odd, 2 = even.
impl TryFrom<i32> for Parity {
    type Error = UartError;

    fn try_from(code: i32) -> UartResult<Self> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Odd),
            2 => Ok(Self::Even),
            other => Err(UartError::invalid(format!("unknown parity code {other}"))),
        }
    }
}

impl FromStr for Parity {
    type Err = UartError;

    fn from_str(s: &str) -> UartResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "n" => Ok(Self::None),
            "odd" | "o" => Ok(Self::Odd),
            "even" | "e" => Ok(Self::Even),
            _ => Err(UartError::invalid(format!("unknown parity '{s}'"))),
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::None => "N",
            Self::Odd => "O",
            Self::Even => "E",
        };
        f.write_str(letter)
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    /// Decode the stop bit count from `CSTOPB` in a `c_cflag` value.
    pub fn from_cflag(cflag: libc::tcflag_t) -> Self {
        if cflag & libc::CSTOPB != 0 {
            Self::Two
        } else {
            Self::One
        }
    }
}

impl TryFrom<i32> for StopBits {
    type Error = UartError;

    fn try_from(bits: i32) -> UartResult<Self> {
        match bits {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(UartError::invalid(format!(
                "stop bits must be 1 or 2, got {other}"
            ))),
        }
    }
}

impl TryFrom<u8> for StopBits {
    type Error = UartError;

    fn try_from(bits: u8) -> UartResult<Self> {
        Self::try_from(i32::from(bits))
    }
}

impl From<StopBits> for u8 {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}

/// Interpret an on/off flag passed as an integer. Only 0 and 1 are accepted.
pub fn flag_from_int(name: &str, value: i32) -> UartResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(UartError::invalid(format!("{name} must be 0 or 1, got {other}"))),
    }
}

/// A complete line configuration.
///
/// Used both to describe the state read back from a device and to apply a
/// configuration in one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSettings {
    /// Line speed. `None` when the device reports a rate outside the
    /// canonical table.
    pub baud_rate: Option<BaudRate>,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// XON/XOFF software flow control.
    pub xonxoff: bool,
    /// RTS/CTS hardware flow control.
    pub rtscts: bool,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            baud_rate: Some(BaudRate::B115200),
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            xonxoff: false,
            rtscts: false,
        }
    }
}

impl fmt::Display for LineSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.baud_rate {
            Some(rate) => write!(f, "{} ", rate.as_u32())?,
            None => f.write_str("? ")?,
        }
        write!(
            f,
            "{}{}{}",
            u8::from(self.data_bits),
            self.parity,
            u8::from(self.stop_bits)
        )?;
        if self.rtscts {
            f.write_str(" rtscts")?;
        }
        if self.xonxoff {
            f.write_str(" xonxoff")?;
        }
        Ok(())
    }
}
