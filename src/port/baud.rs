//! Canonical baud rates and their mapping to platform speed values.

use crate::error::{UartError, UartResult};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! baud_rates {
    ($($variant:ident = $rate:literal),+ $(,)?) => {
        /// One of the 30 accepted line speeds, 50 through 3,000,000 bit/s.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "u32", into = "u32")]
        pub enum BaudRate {
            $($variant,)+
        }

        impl BaudRate {
            /// Every accepted rate, slowest first.
            pub const ALL: &'static [BaudRate] = &[$(BaudRate::$variant,)+];

            /// The rate in bits per second.
            pub const fn as_u32(self) -> u32 {
                match self {
                    $(BaudRate::$variant => $rate,)+
                }
            }

            /// Look up an exact rate. Anything off the table returns `None`.
            pub const fn from_u32(rate: u32) -> Option<Self> {
                match rate {
                    $($rate => Some(BaudRate::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

baud_rates! {
    B50 = 50,
    B75 = 75,
    B110 = 110,
    B134 = 134,
    B150 = 150,
    B200 = 200,
    B300 = 300,
    B600 = 600,
    B1200 = 1200,
    B1800 = 1800,
    B2400 = 2400,
    B4800 = 4800,
    B9600 = 9600,
    B19200 = 19200,
    B38400 = 38400,
    B57600 = 57600,
    B115200 = 115200,
    B128000 = 128000,
    B230400 = 230400,
    B256000 = 256000,
    B460800 = 460800,
    B500000 = 500000,
    B576000 = 576000,
    B921600 = 921600,
    B1000000 = 1000000,
    B1152000 = 1152000,
    B1500000 = 1500000,
    B2000000 = 2000000,
    B2500000 = 2500000,
    B3000000 = 3000000,
}

impl BaudRate {
    /// The `speed_t` value to hand to `cfsetispeed`/`cfsetospeed`.
    ///
    /// Linux encodes speeds as `Bxxx` constants and has none for 128000 or
    /// 256000; those return `None`. BSD-derived systems take the numeric
    /// rate directly.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub fn speed(self) -> Option<libc::speed_t> {
        let speed = match self {
            Self::B50 => libc::B50,
            Self::B75 => libc::B75,
            Self::B110 => libc::B110,
            Self::B134 => libc::B134,
            Self::B150 => libc::B150,
            Self::B200 => libc::B200,
            Self::B300 => libc::B300,
            Self::B600 => libc::B600,
            Self::B1200 => libc::B1200,
            Self::B1800 => libc::B1800,
            Self::B2400 => libc::B2400,
            Self::B4800 => libc::B4800,
            Self::B9600 => libc::B9600,
            Self::B19200 => libc::B19200,
            Self::B38400 => libc::B38400,
            Self::B57600 => libc::B57600,
            Self::B115200 => libc::B115200,
            Self::B230400 => libc::B230400,
            Self::B460800 => libc::B460800,
            Self::B500000 => libc::B500000,
            Self::B576000 => libc::B576000,
            Self::B921600 => libc::B921600,
            Self::B1000000 => libc::B1000000,
            Self::B1152000 => libc::B1152000,
            Self::B1500000 => libc::B1500000,
            Self::B2000000 => libc::B2000000,
            Self::B2500000 => libc::B2500000,
            Self::B3000000 => libc::B3000000,
            Self::B128000 | Self::B256000 => return None,
        };
        Some(speed)
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    pub fn speed(self) -> Option<libc::speed_t> {
        Some(self.as_u32() as libc::speed_t)
    }

    /// Map a `speed_t` read back from a device onto the table.
    pub fn from_speed(speed: libc::speed_t) -> Option<Self> {
        Self::ALL.iter().copied().find(|rate| rate.speed() == Some(speed))
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = UartError;

    fn try_from(rate: u32) -> UartResult<Self> {
        Self::from_u32(rate)
            .ok_or_else(|| UartError::invalid(format!("{rate} is not a standard baud rate")))
    }
}

impl From<BaudRate> for u32 {
    fn from(rate: BaudRate) -> Self {
        rate.as_u32()
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}
