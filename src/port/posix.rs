//! Descriptor-backed device using libc termios.
//!
//! Owns the `File` opened for the device so the descriptor is closed when the
//! device is dropped, on every exit path.

use super::traits::TermiosDevice;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::mem::MaybeUninit;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;

/// A serial device opened read/write through the file system.
pub struct PosixDevice {
    file: File,
    name: String,
}

impl PosixDevice {
    /// Open the device at `path` for reading and writing.
    ///
    /// No terminal attributes are touched; the device keeps whatever
    /// configuration it already had.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        Ok(Self {
            file,
            name: path.to_string_lossy().into_owned(),
        })
    }

    /// The raw descriptor, for callers that need platform-specific ioctls.
    pub fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

fn check(ret: libc::c_int) -> io::Result<()> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

impl TermiosDevice for PosixDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_attributes(&self) -> io::Result<libc::termios> {
        let mut attrs = MaybeUninit::<libc::termios>::uninit();
        // SAFETY: the descriptor is owned by `self.file` and valid for the call,
        // and tcgetattr fully initializes `attrs` when it returns 0.
        check(unsafe { libc::tcgetattr(self.file.as_raw_fd(), attrs.as_mut_ptr()) })?;
        Ok(unsafe { attrs.assume_init() })
    }

    fn set_attributes(&mut self, attrs: &libc::termios) -> io::Result<()> {
        // SAFETY: valid descriptor and a fully initialized termios.
        check(unsafe { libc::tcsetattr(self.file.as_raw_fd(), libc::TCSANOW, attrs) })
    }

    fn flush_queues(&mut self) -> io::Result<()> {
        // SAFETY: valid descriptor.
        check(unsafe { libc::tcflush(self.file.as_raw_fd(), libc::TCIOFLUSH) })
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.file.read(buffer)
    }

    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        self.file.write(buffer)
    }
}

impl std::fmt::Debug for PosixDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosixDevice")
            .field("name", &self.name)
            .field("fd", &self.file.as_raw_fd())
            .finish()
    }
}
