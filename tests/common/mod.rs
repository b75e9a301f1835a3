//! Shared test utilities.
//!
//! Provides a pseudo-terminal pair so integration tests can drive a real
//! termios device without serial hardware.

#![allow(dead_code)]

use std::ffi::CStr;
use std::fs::File;
use std::io;
use std::os::unix::io::FromRawFd;
use std::path::PathBuf;

/// The controlling side of a pseudo-terminal and the path of its device side.
pub struct PtyPair {
    pub master: File,
    pub slave_path: PathBuf,
}

fn check(ret: libc::c_int) -> io::Result<()> {
    if ret != 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Allocate a new pseudo-terminal.
#[cfg(target_os = "linux")]
pub fn open_pty() -> io::Result<PtyPair> {
    let fd = unsafe { libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    let master = unsafe { File::from_raw_fd(fd) };

    check(unsafe { libc::grantpt(fd) })?;
    check(unsafe { libc::unlockpt(fd) })?;

    let mut name = [0 as libc::c_char; 128];
    let ret = unsafe { libc::ptsname_r(fd, name.as_mut_ptr(), name.len()) };
    if ret != 0 {
        return Err(io::Error::from_raw_os_error(ret));
    }
    let slave = unsafe { CStr::from_ptr(name.as_ptr()) };

    Ok(PtyPair {
        master,
        slave_path: PathBuf::from(slave.to_string_lossy().into_owned()),
    })
}
