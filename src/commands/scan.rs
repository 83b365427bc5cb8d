//! Scan command

use spdrw_core::transport::{DeviceTarget, Transport};
use spdrw_core::{Error, Result};
use spdrw_smbus::SmbusDevice;

pub fn run(target: &DeviceTarget) -> Result<()> {
    let (addresses, location) = match target {
        DeviceTarget::SerialPort { name } => {
            let mut session = super::open_bridge(name)?;
            let addresses = session.transport_mut().scan_addresses()?;
            (addresses, format!("port {name}"))
        }
        DeviceTarget::Bus { index } => {
            SmbusDevice::require_privileges()?;
            let buses = SmbusDevice::discover_buses()?;
            if !buses.contains(index) {
                return Err(Error::InvalidArguments("SMBus number not available".into()));
            }
            let mut session = super::open_smbus(*index)?;
            let addresses = session.transport_mut().scan_addresses()?;
            (addresses, format!("SMBus {index}"))
        }
    };

    if addresses.is_empty() {
        return Err(Error::NoDevicesFound);
    }
    for address in addresses {
        println!("Found EEPROM on {location} at address: {address}");
    }
    Ok(())
}
