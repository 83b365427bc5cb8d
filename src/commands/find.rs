//! Find command - enumerate attached bridges and SMBus controllers

use crate::cli::FindFilter;
use spdrw_bridge::{BridgeDevice, SerialSettings};
use spdrw_core::Result;
use spdrw_smbus::SmbusDevice;

pub fn run(filter: FindFilter) -> Result<()> {
    match filter {
        FindFilter::Serial => find_bridges(),
        FindFilter::Smbus => {
            SmbusDevice::require_privileges()?;
            find_buses()
        }
        FindFilter::All => {
            find_bridges()?;
            // buses are only visible with elevated rights; skip quietly
            if SmbusDevice::require_privileges().is_ok() {
                find_buses()?;
            }
            Ok(())
        }
    }
}

fn find_bridges() -> Result<()> {
    let settings = SerialSettings::default();
    let found = BridgeDevice::discover(&settings);
    if found.is_empty() {
        println!("No bridges found");
    }
    for port in found {
        println!("Found SPD bridge on serial port: {port}:{}", settings.baud_rate);
    }
    Ok(())
}

fn find_buses() -> Result<()> {
    let buses = SmbusDevice::discover_buses()?;
    if buses.is_empty() {
        println!("No SMBus found");
    }
    for bus in buses {
        println!("Found SMBus # {bus}");
    }
    Ok(())
}
