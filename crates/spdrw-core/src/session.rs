//! Scoped device session
//!
//! A [`Session`] owns one transport for the lifetime of one command and
//! guarantees disconnection on every exit path through `Drop`, so
//! cleanup is never left to caller discipline. No write operation can
//! begin without an open session, which means the firmware-version and
//! liveness gates have always passed first.

use crate::error::{Error, Result};
use crate::transport::{FirmwareVersion, I2cAddress, Transport, REQUIRED_FIRMWARE_VERSION};

/// An open, verified connection to one device.
#[derive(Debug)]
pub struct Session<T: Transport> {
    transport: T,
    firmware: Option<FirmwareVersion>,
}

impl<T: Transport> Session<T> {
    /// Connect the transport, then gate on firmware version and
    /// liveness. Both rejection paths disconnect before returning.
    pub fn open(mut transport: T) -> Result<Self> {
        transport.connect()?;

        let firmware = match transport.firmware_version() {
            Ok(version) => version,
            Err(e) => {
                transport.disconnect();
                return Err(e);
            }
        };
        if let Some(found) = firmware {
            if found < REQUIRED_FIRMWARE_VERSION {
                let port = transport.describe();
                transport.disconnect();
                return Err(Error::FirmwareOutdated {
                    port,
                    found: found.0,
                    required: REQUIRED_FIRMWARE_VERSION.0,
                });
            }
        }

        match transport.test() {
            Ok(true) => {}
            Ok(false) | Err(_) => {
                let target = transport.describe();
                transport.disconnect();
                return Err(Error::DeviceUnresponsive { target });
            }
        }

        log::debug!("session open on {}", transport.describe());
        Ok(Self {
            transport,
            firmware,
        })
    }

    /// Select the device to operate on.
    pub fn select(&mut self, address: I2cAddress) -> Result<()> {
        self.transport.select(address)
    }

    pub fn firmware(&self) -> Option<FirmwareVersion> {
        self.firmware
    }

    pub fn address(&self) -> Option<I2cAddress> {
        self.transport.address()
    }

    pub fn data_length(&self) -> usize {
        self.transport.data_length()
    }

    pub fn describe(&self) -> String {
        self.transport.describe()
    }

    /// Direct access to the owned transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.transport.disconnect();
    }
}
