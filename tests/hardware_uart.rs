//! Tests requiring actual serial hardware.
//!
//! # Running Hardware Tests
//!
//! ```bash
//! export TEST_PORT=/dev/ttyUSB0          # required
//! export TEST_BAUD=115200                # optional, default: 115200
//! export TEST_LOOPBACK=1                 # if the port has TX-RX connected
//!
//! cargo test --features hardware-tests -- --ignored
//! ```

#![cfg(feature = "hardware-tests")]

use std::env;
use std::thread;
use std::time::Duration;
use uartkit::{DataBits, Parity, StopBits, Uart};

fn get_test_port() -> Option<String> {
    env::var("TEST_PORT").ok()
}

fn get_test_baud() -> u32 {
    env::var("TEST_BAUD")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(115200)
}

fn is_loopback_enabled() -> bool {
    env::var("TEST_LOOPBACK").ok().as_deref() == Some("1")
}

#[test]
#[ignore]
fn test_real_port_configure() {
    let Some(port) = get_test_port() else {
        println!("Skipping hardware test: TEST_PORT not set");
        return;
    };

    let mut uart = Uart::open(&port).expect("open test port");
    uart.set_baudrate(get_test_baud()).unwrap();
    uart.set_mode(DataBits::Eight, Parity::None, StopBits::One).unwrap();
    uart.set_flowcontrol(false, false).unwrap();
    uart.flush().unwrap();

    let settings = uart.attributes().unwrap();
    assert_eq!(settings.data_bits, DataBits::Eight);
    assert_eq!(settings.baud_rate.map(|r| r.as_u32()), Some(get_test_baud()));
    uart.stop().unwrap();
}

#[test]
#[ignore]
fn test_real_port_loopback() {
    let Some(port) = get_test_port() else {
        println!("Skipping hardware test: TEST_PORT not set");
        return;
    };
    if !is_loopback_enabled() {
        println!("Skipping loopback test: TEST_LOOPBACK not set");
        return;
    }

    let mut uart = Uart::open(&port).expect("open test port");
    uart.set_baudrate(get_test_baud()).unwrap();
    uart.flush().unwrap();

    let payload = b"uartkit loopback\n";
    assert_eq!(uart.write(payload).unwrap(), payload.len());
    thread::sleep(Duration::from_millis(100));

    let mut buf = [0u8; 64];
    let n = uart.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], payload);
}
