use std::env;

use array_371x::load::ElectronicLoad;
use inquire::Select;
use serialport::SerialPort;

// Configuration constants - adjust these for your setup
const BAUD_RATE: u32 = 9600;
// A silent device should become an error, not a hang.
const SERIAL_TIMEOUT_MS: u64 = 1000;
const DEVICE_ADDRESS: u8 = 0x00;
const MAX_CURRENT_A: f64 = 3.0;
const MAX_POWER_W: f64 = 50.0;
const CURRENT_STEP_A: f64 = 0.05;
const STEP_COUNT: u32 = 5;
const SETTLE_DELAY_MS: u64 = 500;

pub struct PortWrapper(Box<dyn SerialPort>);

#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::ConnectionRefused => embedded_io::ErrorKind::ConnectionRefused,
            std::io::ErrorKind::ConnectionReset => embedded_io::ErrorKind::ConnectionReset,
            std::io::ErrorKind::ConnectionAborted => embedded_io::ErrorKind::ConnectionAborted,
            std::io::ErrorKind::NotConnected => embedded_io::ErrorKind::NotConnected,
            std::io::ErrorKind::AddrInUse => embedded_io::ErrorKind::AddrInUse,
            std::io::ErrorKind::AddrNotAvailable => embedded_io::ErrorKind::AddrNotAvailable,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::AlreadyExists => embedded_io::ErrorKind::AlreadyExists,
            std::io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            std::io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            std::io::ErrorKind::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for PortWrapper {
    type Error = IoError;
}

impl embedded_io::Read for PortWrapper {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for PortWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

fn main() {
    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    println!("Using port: {}", port_name);

    let port = serialport::new(&port_name, BAUD_RATE)
        .timeout(std::time::Duration::from_millis(SERIAL_TIMEOUT_MS))
        .open()
        .expect("Failed to open serial port");

    let port = PortWrapper(port);

    // Create a load object
    let mut load = ElectronicLoad::new(port, DEVICE_ADDRESS).expect("Invalid device address");

    // The protocol resends limits with every setpoint, so configure them first
    load.set_max_current_a(MAX_CURRENT_A);
    load.set_max_power_w(MAX_POWER_W);

    // Take remote control and enable the input
    load.set_remote_enabled(true, true).unwrap();
    println!("Remote control enabled, input on");

    // Step the load current and read back the operating point each time
    for step in 1..=STEP_COUNT {
        let setpoint = CURRENT_STEP_A * step as f64;
        load.set_current_a(setpoint).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(SETTLE_DELAY_MS));

        let state = load.read_state().unwrap();
        println!(
            "iset {:.3}A -> {:.3}V {:.3}A {:.1}W",
            setpoint,
            array_371x::scaling::Scale::VOLTAGE.to_physical(state.voltage),
            array_371x::scaling::Scale::CURRENT.to_physical(state.current as u32),
            array_371x::scaling::Scale::POWER.to_physical(state.power as u32),
        );

        if state.status.excessive_temperature() || state.status.incorrect_polarity() {
            eprintln!("Device reported a fault, stopping");
            break;
        }
    }

    // Zero the setpoint and hand control back to the front panel
    load.set_current_a(0.0).unwrap();
    load.set_remote_enabled(false, false).unwrap();
    println!("Input off, front panel control restored");
}
