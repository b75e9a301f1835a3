//! The UART handle.
//!
//! A [`Uart`] owns exactly one device. Every operation validates its
//! arguments, then forwards to one system call or a get/modify/set
//! attribute sequence, and reports the outcome as a [`UartResult`].
//!
//! ```text
//! Uart::open(path) ──> PosixDevice (File + tcgetattr/tcsetattr/tcflush)
//! Uart::with_device ─> MockDevice  (tests)
//! ```
//!
//! Mutating operations take `&mut self`, so a handle cannot be used from two
//! threads at once without the caller adding a lock around it.

use crate::error::{UartError, UartResult};
use crate::port::{
    flag_from_int, BaudRate, DataBits, LineSettings, Parity, PosixDevice, StopBits,
    TermiosDevice,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Software flow control input/output flags managed by `set_flowcontrol`.
const SOFTWARE_FLOW_FLAGS: libc::tcflag_t = libc::IXON | libc::IXOFF | libc::IXANY;

/// Opt-in reproductions of behavior found in older UART layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatFlags {
    /// Reject two stop bits with `InvalidParameter` and leave the device
    /// untouched.
    pub reject_two_stop_bits: bool,
    /// Leave IXON/IXOFF/IXANY set when software flow control is turned off.
    pub sticky_software_flow: bool,
}

fn require_termios() -> UartResult<()> {
    if cfg!(feature = "termios") {
        Ok(())
    } else {
        Err(UartError::not_supported(
            "terminal attribute control is disabled in this build",
        ))
    }
}

/// An open UART device.
///
/// The descriptor is released by [`stop`](Self::stop) or, if the handle is
/// dropped while still open, by the device's own drop.
#[derive(Debug)]
pub struct Uart<D: TermiosDevice = PosixDevice> {
    device: Option<D>,
    path: String,
    compat: CompatFlags,
}

impl Uart<PosixDevice> {
    /// Open the device at `path` for reading and writing.
    ///
    /// # Example
    /// ```no_run
    /// use uartkit::{Parity, StopBits, DataBits, Uart};
    ///
    /// let mut uart = Uart::open("/dev/ttyUSB0")?;
    /// uart.set_baudrate(115200)?;
    /// uart.set_mode(DataBits::Eight, Parity::None, StopBits::One)?;
    /// uart.write(b"AT\r\n")?;
    /// uart.stop()?;
    /// # Ok::<(), uartkit::UartError>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> UartResult<Self> {
        let path = path.as_ref();
        let device = PosixDevice::open(path).map_err(|source| {
            warn!(path = %path.display(), error = %source, "open failed");
            UartError::Open {
                path: path.display().to_string(),
                source,
            }
        })?;
        debug!(path = %path.display(), "opened UART");
        Ok(Self::with_device(device))
    }
}

impl<D: TermiosDevice> Uart<D> {
    /// Wrap an already opened device.
    pub fn with_device(device: D) -> Self {
        Self {
            path: device.name().to_string(),
            device: Some(device),
            compat: CompatFlags::default(),
        }
    }

    /// Use the given compatibility flags for subsequent operations.
    pub fn with_compat(mut self, compat: CompatFlags) -> Self {
        self.compat = compat;
        self
    }

    /// The path the device was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether [`stop`](Self::stop) has not been called yet.
    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn device_ref(&self) -> UartResult<&D> {
        self.device.as_ref().ok_or(UartError::Closed)
    }

    fn device_mut(&mut self) -> UartResult<&mut D> {
        self.device.as_mut().ok_or(UartError::Closed)
    }

    /// Close the device.
    ///
    /// Fails with `InvalidParameter` if the handle was already stopped.
    pub fn stop(&mut self) -> UartResult<()> {
        let device = self.device.take().ok_or(UartError::Closed)?;
        drop(device);
        debug!(path = %self.path, "closed UART");
        Ok(())
    }

    /// Discard all data waiting in the input and output queues.
    pub fn flush(&mut self) -> UartResult<()> {
        require_termios()?;
        let device = self.device_mut()?;
        device.flush_queues().map_err(|e| {
            warn!(path = %device.name(), error = %e, "tcflush failed");
            UartError::not_supported(format!("flushing {} failed: {e}", device.name()))
        })?;
        debug!(path = %device.name(), "flushed input and output queues");
        Ok(())
    }

    /// Set the line speed. `rate` must be one of the canonical rates in
    /// [`BaudRate::ALL`].
    pub fn set_baudrate(&mut self, rate: u32) -> UartResult<()> {
        require_termios()?;
        self.device_ref()?;
        self.set_baud(BaudRate::try_from(rate)?)
    }

    /// Typed form of [`set_baudrate`](Self::set_baudrate).
    pub fn set_baud(&mut self, rate: BaudRate) -> UartResult<()> {
        require_termios()?;
        self.device_ref()?;
        let speed = rate.speed().ok_or_else(|| {
            UartError::not_supported(format!("{rate} baud has no speed constant on this platform"))
        })?;

        self.modify_attributes(|attrs| {
            // SAFETY: `attrs` is a valid termios obtained from tcgetattr.
            let ret = unsafe {
                libc::cfsetispeed(&mut *attrs, speed) | libc::cfsetospeed(&mut *attrs, speed)
            };
            if ret != 0 {
                return Err(UartError::syscall("cfsetspeed", std::io::Error::last_os_error()));
            }
            Ok(())
        })?;
        debug!(path = %self.path, baud = rate.as_u32(), "set baud rate");
        Ok(())
    }

    /// Set character size, parity and stop bits.
    pub fn set_mode(
        &mut self,
        data_bits: DataBits,
        parity: Parity,
        stop_bits: StopBits,
    ) -> UartResult<()> {
        require_termios()?;
        self.device_ref()?;
        if stop_bits == StopBits::Two && self.compat.reject_two_stop_bits {
            return Err(UartError::invalid("two stop bits are rejected in compatibility mode"));
        }

        self.modify_attributes(|attrs| {
            attrs.c_cflag &= !libc::CSIZE;
            attrs.c_cflag |= data_bits.csize();

            match parity {
                Parity::Even => {
                    attrs.c_cflag |= libc::PARENB;
                    attrs.c_cflag &= !libc::PARODD;
                }
                Parity::Odd => attrs.c_cflag |= libc::PARENB | libc::PARODD,
                Parity::None => attrs.c_cflag &= !(libc::PARENB | libc::PARODD),
            }

            match stop_bits {
                StopBits::One => attrs.c_cflag &= !libc::CSTOPB,
                StopBits::Two => attrs.c_cflag |= libc::CSTOPB,
            }
            Ok(())
        })?;
        debug!(
            path = %self.path,
            data_bits = u8::from(data_bits),
            %parity,
            stop_bits = u8::from(stop_bits),
            "set line mode"
        );
        Ok(())
    }

    /// Integer form of [`set_mode`](Self::set_mode): `bytesize` 5..=8,
    /// `parity` 0 (none), 1 (odd) or 2 (even), `stopbits` 1 or 2.
    pub fn set_mode_raw(&mut self, bytesize: i32, parity: i32, stopbits: i32) -> UartResult<()> {
        require_termios()?;
        self.device_ref()?;
        self.set_mode(
            DataBits::try_from(bytesize)?,
            Parity::try_from(parity)?,
            StopBits::try_from(stopbits)?,
        )
    }

    /// Enable or disable XON/XOFF and RTS/CTS flow control independently.
    pub fn set_flowcontrol(&mut self, xonxoff: bool, rtscts: bool) -> UartResult<()> {
        require_termios()?;
        self.device_ref()?;
        let sticky = self.compat.sticky_software_flow;

        self.modify_attributes(|attrs| {
            if rtscts {
                attrs.c_cflag |= libc::CRTSCTS;
            } else {
                attrs.c_cflag &= !libc::CRTSCTS;
            }

            if xonxoff {
                attrs.c_iflag |= SOFTWARE_FLOW_FLAGS;
            } else if !sticky {
                attrs.c_iflag &= !SOFTWARE_FLOW_FLAGS;
            }
            Ok(())
        })?;
        debug!(path = %self.path, xonxoff, rtscts, "set flow control");
        Ok(())
    }

    /// Integer form of [`set_flowcontrol`](Self::set_flowcontrol); both
    /// flags must be 0 or 1.
    pub fn set_flowcontrol_raw(&mut self, xonxoff: i32, rtscts: i32) -> UartResult<()> {
        require_termios()?;
        self.device_ref()?;
        let xonxoff = flag_from_int("xonxoff", xonxoff)?;
        let rtscts = flag_from_int("rtscts", rtscts)?;
        self.set_flowcontrol(xonxoff, rtscts)
    }

    /// Read up to `buffer.len()` bytes. Blocks according to the device's
    /// current mode; returns 0 when no data is available or at end of file.
    pub fn read(&mut self, buffer: &mut [u8]) -> UartResult<usize> {
        let device = self.device_mut()?;
        if buffer.is_empty() {
            return Err(UartError::invalid("read buffer must not be empty"));
        }
        let n = device.read(buffer).map_err(|e| {
            warn!(path = %device.name(), error = %e, "read failed");
            UartError::syscall("read", e)
        })?;
        debug!(path = %device.name(), bytes = n, "read");
        Ok(n)
    }

    /// Write `buffer`, returning how many bytes the device accepted. This can
    /// be fewer than `buffer.len()`.
    pub fn write(&mut self, buffer: &[u8]) -> UartResult<usize> {
        let device = self.device_mut()?;
        if buffer.is_empty() {
            return Err(UartError::invalid("write buffer must not be empty"));
        }
        let n = device.write(buffer).map_err(|e| {
            warn!(path = %device.name(), error = %e, "write failed");
            UartError::syscall("write", e)
        })?;
        debug!(path = %device.name(), bytes = n, requested = buffer.len(), "wrote");
        Ok(n)
    }

    /// Decode the device's current line settings.
    pub fn attributes(&self) -> UartResult<LineSettings> {
        require_termios()?;
        let device = self.device_ref()?;
        let attrs = device
            .get_attributes()
            .map_err(|e| UartError::syscall("tcgetattr", e))?;

        // SAFETY: `attrs` was filled in by tcgetattr.
        let speed = unsafe { libc::cfgetospeed(&attrs) };
        Ok(LineSettings {
            baud_rate: BaudRate::from_speed(speed),
            data_bits: DataBits::from_cflag(attrs.c_cflag),
            parity: Parity::from_cflag(attrs.c_cflag),
            stop_bits: StopBits::from_cflag(attrs.c_cflag),
            xonxoff: attrs.c_iflag & SOFTWARE_FLOW_FLAGS == SOFTWARE_FLOW_FLAGS,
            rtscts: attrs.c_cflag & libc::CRTSCTS == libc::CRTSCTS,
        })
    }

    /// Apply a full configuration: speed (when given), mode, then flow
    /// control. Stops at the first failure.
    pub fn apply(&mut self, settings: &LineSettings) -> UartResult<()> {
        if let Some(rate) = settings.baud_rate {
            self.set_baud(rate)?;
        }
        self.set_mode(settings.data_bits, settings.parity, settings.stop_bits)?;
        self.set_flowcontrol(settings.xonxoff, settings.rtscts)
    }

    /// Fetch attributes, let `edit` change them, and apply them with
    /// `TCSANOW`.
    fn modify_attributes<F>(&mut self, edit: F) -> UartResult<()>
    where
        F: FnOnce(&mut libc::termios) -> UartResult<()>,
    {
        let device = self.device_mut()?;
        let mut attrs = device.get_attributes().map_err(|e| {
            warn!(path = %device.name(), error = %e, "tcgetattr failed");
            UartError::syscall("tcgetattr", e)
        })?;
        edit(&mut attrs)?;
        device.set_attributes(&attrs).map_err(|e| {
            warn!(path = %device.name(), error = %e, "tcsetattr failed");
            UartError::syscall("tcsetattr", e)
        })
    }
}


#[cfg(all(test, not(feature = "termios")))]
mod no_termios_tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::port::MockDevice;

    #[test]
    fn test_attribute_control_not_supported() {
        let mut uart = Uart::with_device(MockDevice::new("MOCK0"));
        assert_eq!(uart.flush().unwrap_err().kind(), ErrorKind::NotSupported);
        assert_eq!(uart.set_baudrate(9600).unwrap_err().kind(), ErrorKind::NotSupported);
        assert_eq!(
            uart.set_flowcontrol(true, true).unwrap_err().kind(),
            ErrorKind::NotSupported
        );
        // Plain I/O still works
        assert_eq!(uart.write(b"ok").unwrap(), 2);
    }

    #[test]
    fn test_mode_and_attributes_not_supported() {
        let observer = MockDevice::new("MOCK0");
        let mut uart = Uart::with_device(observer.clone());

        let err = uart.set_mode(DataBits::Seven, Parity::Even, StopBits::Two).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
        assert_eq!(uart.set_mode_raw(8, 0, 1).unwrap_err().kind(), ErrorKind::NotSupported);
        assert_eq!(uart.set_flowcontrol_raw(0, 1).unwrap_err().kind(), ErrorKind::NotSupported);
        assert_eq!(uart.attributes().unwrap_err().kind(), ErrorKind::NotSupported);
        assert_eq!(observer.set_count(), 0);
    }

    #[test]
    fn test_stopped_handle_reports_not_supported() {
        let mut uart = Uart::with_device(MockDevice::new("MOCK0"));
        uart.stop().unwrap();

        // The build check comes before the handle check
        assert_eq!(uart.flush().unwrap_err().kind(), ErrorKind::NotSupported);
        assert_eq!(uart.set_baudrate(9600).unwrap_err().kind(), ErrorKind::NotSupported);
        assert_eq!(uart.set_mode_raw(9, 0, 1).unwrap_err().kind(), ErrorKind::NotSupported);
        assert!(!matches!(uart.attributes().unwrap_err(), UartError::Closed));
        // I/O has no build switch, so it still sees the stopped handle
        assert!(matches!(uart.write(b"x").unwrap_err(), UartError::Closed));
    }
}
