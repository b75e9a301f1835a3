//! Loading configuration files from disk.

use pretty_assertions::assert_eq;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;
use uartkit::config::LogFormat;
use uartkit::{BaudRate, ConfigError, ConfigLoader, ErrorKind, Parity, StopBits};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_load_from_file() {
    let file = write_config(
        r#"
        [device]
        path = "/dev/ttyAMA0"
        baud = 57600
        parity = "odd"
        stop_bits = 2
        rtscts = true

        [logging]
        level = "debug"
        format = "json"
        "#,
    );

    let loader = ConfigLoader::load_from(file.path()).unwrap();
    let config = loader.config();
    assert_eq!(config.device.path, "/dev/ttyAMA0");
    assert_eq!(config.logging.format, LogFormat::Json);

    let settings = config.device.line_settings().unwrap();
    assert_eq!(settings.baud_rate, Some(BaudRate::B57600));
    assert_eq!(settings.parity, Parity::Odd);
    assert_eq!(settings.stop_bits, StopBits::Two);
    assert!(settings.rtscts);
}

#[test]
#[serial]
fn test_invalid_value_rejected() {
    let file = write_config("[device]\nbaud = 14400\n");
    let err = ConfigLoader::load_from(file.path()).unwrap_err();
    assert_eq!(err.key(), Some("device.baud"));
    match err {
        ConfigError::InvalidSetting { source, .. } => {
            assert_eq!(source.kind(), ErrorKind::InvalidParameter);
        }
        other => panic!("expected an invalid setting, got {other}"),
    }
}

#[test]
#[serial]
fn test_malformed_toml() {
    let file = write_config("[device\npath = ");
    let err = ConfigLoader::load_from(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
#[serial]
fn test_env_path_resolution() {
    let file = write_config("[device]\npath = \"/dev/ttyUSB7\"\n");
    std::env::set_var("UARTKIT_CONFIG", file.path());

    let loader = ConfigLoader::load().unwrap();
    assert_eq!(loader.config_path.as_deref(), Some(file.path()));
    assert_eq!(loader.config().device.path, "/dev/ttyUSB7");

    std::env::remove_var("UARTKIT_CONFIG");
}

#[test]
#[serial]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = ConfigLoader::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read { path: ref p, .. } if *p == path));
    assert_eq!(err.key(), None);
}

#[test]
#[serial]
fn test_env_override_beats_file() {
    let file = write_config("[device]
path = \"/dev/ttyS1\"
baud = 9600
");
    std::env::set_var("UARTKIT_DEVICE_BAUD", "230400");

    let loader = ConfigLoader::load_from(file.path());
    std::env::remove_var("UARTKIT_DEVICE_BAUD");

    let config = loader.unwrap().into_config();
    assert_eq!(config.device.path, "/dev/ttyS1");
    assert_eq!(config.device.baud, 230400);
}
