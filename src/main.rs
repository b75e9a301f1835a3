use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use uartkit::{
    list_ports, logging, Config, ConfigError, ConfigLoader, DataBits, ErrorKind, LineSettings,
    Parity, StopBits, Uart, UartError,
};

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "uartctl",
    version,
    about = "Configure and talk to UART devices through termios.",
    long_about = "Opens a serial device, applies line settings (baud rate, framing, flow control), and reads or writes raw bytes. Defaults come from uartkit.toml; flags override them."
)]
struct Cli {
    /// Configuration file. Defaults to the standard search path.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Device path, overriding `device.path` from the configuration.
    #[arg(short, long, global = true)]
    device: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List serial devices found on this machine.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print the device's current line settings.
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Apply line settings. Flags not given fall back to the configuration.
    Set(SetArgs),
    /// Discard pending input and output.
    Flush,
    /// Read once from the device and print what arrived.
    Read {
        /// Maximum number of bytes; defaults to `device.read_chunk`.
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Print bytes as hex instead of text.
        #[arg(long)]
        hex: bool,
    },
    /// Write data to the device.
    Write {
        data: String,
        /// Interpret DATA as hex digits, e.g. "41 54 0d 0a".
        #[arg(long)]
        hex: bool,
        /// Append "\r\n".
        #[arg(long)]
        crlf: bool,
    },
}

#[derive(Args, Debug, Default)]
struct SetArgs {
    #[arg(short, long)]
    baud: Option<u32>,
    #[arg(long)]
    data_bits: Option<i32>,
    /// none, odd or even
    #[arg(long)]
    parity: Option<String>,
    #[arg(long)]
    stop_bits: Option<i32>,
    /// 0 or 1
    #[arg(long)]
    xonxoff: Option<i32>,
    /// 0 or 1
    #[arg(long)]
    rtscts: Option<i32>,
}

// --- Main Application Entry Point ---
fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = logging::init(&config.logging, cli.verbose) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(exit_code(e.as_ref()))
        }
    }
}

fn load_config(explicit: Option<&PathBuf>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => ConfigLoader::load_from(path).map(ConfigLoader::into_config),
        None => Ok(match ConfigLoader::load() {
            Ok(loader) => loader.into_config(),
            Err(e) => {
                eprintln!("Warning: Failed to load config, using defaults: {e}");
                ConfigLoader::with_defaults().into_config()
            }
        }),
    }
}

fn exit_code(err: &(dyn Error + 'static)) -> u8 {
    let uart_err = match err.downcast_ref::<ConfigError>() {
        Some(ConfigError::InvalidSetting { source, .. }) => Some(source),
        _ => err.downcast_ref::<UartError>(),
    };
    match uart_err.map(UartError::kind) {
        Some(ErrorKind::InvalidParameter) => 2,
        Some(ErrorKind::NotSupported) => 3,
        _ => 1,
    }
}

fn run(cli: Cli, config: Config) -> Result<(), Box<dyn Error>> {
    if let Command::List { json } = cli.command {
        return print_ports(json);
    }

    let path = cli.device.clone().unwrap_or_else(|| config.device.path.clone());
    let mut uart = Uart::open(&path)?.with_compat(config.compat);
    info!(path = %path, "device opened");

    let result = execute(&mut uart, cli.command, &config);
    // Always release the descriptor; report the first failure.
    let stopped = uart.stop();
    result?;
    stopped?;
    Ok(())
}

fn execute(uart: &mut Uart, command: Command, config: &Config) -> Result<(), Box<dyn Error>> {
    match command {
        Command::List { json } => print_ports(json)?,
        Command::Show { json } => {
            let settings = uart.attributes()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                println!("{}: {settings}", uart.path());
            }
        }
        Command::Set(args) => {
            let settings = merge_settings(&args, config)?;
            debug!(%settings, "applying");
            uart.apply(&settings)?;
            println!("{}: {}", uart.path(), uart.attributes()?);
        }
        Command::Flush => uart.flush()?,
        Command::Read { count, hex } => {
            let mut buffer = vec![0u8; count.unwrap_or(config.device.read_chunk)];
            let n = uart.read(&mut buffer)?;
            let data = &buffer[..n];
            if hex {
                println!("{}", to_hex(data));
            } else {
                println!("{}", String::from_utf8_lossy(data));
            }
        }
        Command::Write { data, hex, crlf } => {
            let mut bytes = if hex {
                parse_hex(&data).map_err(UartError::invalid)?
            } else {
                data.into_bytes()
            };
            if crlf {
                bytes.extend_from_slice(b"\r\n");
            }
            let n = uart.write(&bytes)?;
            println!("wrote {n} of {} bytes", bytes.len());
        }
    }
    Ok(())
}

/// Overlay command-line flags on the configured line settings.
fn merge_settings(args: &SetArgs, config: &Config) -> Result<LineSettings, Box<dyn Error>> {
    let mut settings = config.device.line_settings()?;

    if let Some(baud) = args.baud {
        settings.baud_rate = Some(baud.try_into()?);
    }
    if let Some(bits) = args.data_bits {
        settings.data_bits = DataBits::try_from(bits)?;
    }
    if let Some(ref parity) = args.parity {
        settings.parity = parity.parse::<Parity>()?;
    }
    if let Some(bits) = args.stop_bits {
        settings.stop_bits = StopBits::try_from(bits)?;
    }
    if let Some(flag) = args.xonxoff {
        settings.xonxoff = uartkit::port::flag_from_int("xonxoff", flag)?;
    }
    if let Some(flag) = args.rtscts {
        settings.rtscts = uartkit::port::flag_from_int("rtscts", flag)?;
    }
    Ok(settings)
}

fn print_ports(json: bool) -> Result<(), Box<dyn Error>> {
    let ports = list_ports()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }
    if ports.is_empty() {
        println!("No serial devices found.");
    }
    for port in ports {
        match port.description {
            Some(desc) => println!("{}\t{}\t{}", port.path, port.kind, desc),
            None => println!("{}\t{}", port.path, port.kind),
        }
    }
    Ok(())
}

fn to_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if !digits.is_ascii() {
        return Err(format!("non-hex characters in '{input}'"));
    }
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in '{input}'"));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| format!("invalid hex byte '{}'", &digits[i..i + 2]))
        })
        .collect()
}
