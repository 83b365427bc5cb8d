//! Command implementations
//!
//! Each operation opens its own session, operates, and lets the session
//! drop (disconnecting) on every exit path. Orchestration functions are
//! generic over the transport so the same code serves both backends.

mod find;
mod firmware;
mod read;
mod scan;
mod wp;
mod write;

use crate::cli::{self, Command, Operation};
use spdrw_bridge::{BridgeDevice, SerialSettings};
use spdrw_core::{Result, Session};
use spdrw_smbus::SmbusDevice;

pub fn run(command: Command) -> Result<()> {
    let opts = command.output;
    match command.operation {
        Operation::ShowHelp => {
            cli::print_help();
            Ok(())
        }
        Operation::Find { filter } => find::run(filter),
        Operation::Scan { target } => scan::run(&target),
        Operation::Read {
            target,
            address,
            output,
        } => read::run(&target, address, output.as_deref(), &opts),
        Operation::Write {
            port,
            address,
            input,
            forced,
        } => write::run(&port, address, &input, forced, &opts),
        Operation::SetProtection {
            port,
            address,
            block,
            permanent: false,
        } => wp::enable(&port, address, block),
        Operation::SetProtection {
            port,
            address,
            permanent: true,
            ..
        } => wp::enable_permanent(&port, address),
        Operation::ClearProtection { port, address } => wp::disable(&port, address),
        Operation::ExportFirmware { destination } => firmware::run(&destination),
    }
}

/// Open a verified session to the serial bridge.
pub(crate) fn open_bridge(port: &str) -> Result<Session<BridgeDevice>> {
    Session::open(BridgeDevice::new(port, SerialSettings::default()))
}

/// Open a verified session to a host SMBus controller.
pub(crate) fn open_smbus(index: u8) -> Result<Session<SmbusDevice>> {
    SmbusDevice::require_privileges()?;
    Session::open(SmbusDevice::new(index))
}
