//! Failure paths when the opened path is not a terminal.

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use uartkit::{ErrorKind, Uart, UartError};

#[test]
fn test_open_missing_path_yields_no_handle() {
    let err = Uart::open("/dev/does-not-exist-uartkit").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert!(matches!(err, UartError::Open { .. }));
    assert!(err.to_string().contains("/dev/does-not-exist-uartkit"));
}

#[cfg(feature = "termios")]
#[test]
fn test_attribute_calls_fail_on_regular_file() {
    let file = NamedTempFile::new().unwrap();
    let mut uart = Uart::open(file.path()).unwrap();

    let err = uart.set_baudrate(9600).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert_eq!(err.io_error().and_then(|e| e.raw_os_error()), Some(libc::ENOTTY));

    assert_eq!(uart.set_flowcontrol(true, false).unwrap_err().kind(), ErrorKind::Unknown);
    assert_eq!(uart.attributes().unwrap_err().kind(), ErrorKind::Unknown);

    // A failing tcflush is reported as unsupported
    assert_eq!(uart.flush().unwrap_err().kind(), ErrorKind::NotSupported);

    // Validation still runs before any system call
    assert_eq!(uart.set_baudrate(7).unwrap_err().kind(), ErrorKind::InvalidParameter);
}

#[test]
fn test_plain_io_on_regular_file() {
    let file = NamedTempFile::new().unwrap();
    let mut uart = Uart::open(file.path()).unwrap();

    assert_eq!(uart.write(b"hello").unwrap(), 5);

    // Positioned at the end of the file: end-of-file reads as zero bytes
    let mut buf = [0u8; 8];
    assert_eq!(uart.read(&mut buf).unwrap(), 0);

    uart.stop().unwrap();
    assert_eq!(std::fs::read(file.path()).unwrap(), b"hello");
}

#[test]
fn test_drop_closes_without_stop() {
    let file = NamedTempFile::new().unwrap();
    {
        let mut uart = Uart::open(file.path()).unwrap();
        uart.write(b"scoped").unwrap();
    }
    assert_eq!(std::fs::read(file.path()).unwrap(), b"scoped");
}
