//! Device layer beneath the UART handle.
//!
//! Provides the `TermiosDevice` trait with a libc-backed implementation and
//! a mock, plus the line parameter types and serial device discovery.

pub mod baud;
pub mod mock;
pub mod posix;
pub mod traits;

pub use baud::BaudRate;
pub use mock::{MockCall, MockDevice};
pub use posix::PosixDevice;
pub use traits::*;

use serde::Serialize;

/// A serial device found on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    /// Device path, e.g. `/dev/ttyUSB0`.
    pub path: String,
    /// Transport: "usb", "pci", "bluetooth" or "unknown".
    pub kind: &'static str,
    /// USB manufacturer/product strings, when the device reports them.
    pub description: Option<String>,
}

/// Enumerate the serial devices present on this machine.
pub fn list_ports() -> Result<Vec<PortInfo>, serialport::Error> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|port| {
            let (kind, description) = match port.port_type {
                serialport::SerialPortType::UsbPort(usb) => {
                    let parts: Vec<String> =
                        [usb.manufacturer, usb.product].into_iter().flatten().collect();
                    let description = if parts.is_empty() {
                        format!("{:04x}:{:04x}", usb.vid, usb.pid)
                    } else {
                        parts.join(" ")
                    };
                    ("usb", Some(description))
                }
                serialport::SerialPortType::PciPort => ("pci", None),
                serialport::SerialPortType::BluetoothPort => ("bluetooth", None),
                serialport::SerialPortType::Unknown => ("unknown", None),
            };
            PortInfo {
                path: port.port_name,
                kind,
                description,
            }
        })
        .collect())
}
