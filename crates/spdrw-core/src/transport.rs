//! Transport capability traits and device addressing types
//!
//! Two physically different access paths share one call surface: a
//! serial-attached microcontroller bridge and a host-side SMBus
//! controller. Orchestration code is written against [`Transport`] and
//! never branches on the backend kind; the backend is picked once, from
//! the parsed [`DeviceTarget`].

use crate::error::{Error, Result};
use core::fmt;

/// Minimum bridge firmware version the orchestration layer will talk to.
pub const REQUIRED_FIRMWARE_VERSION: FirmwareVersion = FirmwareVersion(20230101);

/// Date-coded bridge firmware version (e.g. 20230205).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FirmwareVersion(pub u32);

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which physical backend a command addresses. Exactly one is active per
/// session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceTarget {
    /// Serial bridge addressed by port name ("COM3")
    SerialPort { name: String },
    /// Host bus controller addressed by bus index
    Bus { index: u8 },
}

impl DeviceTarget {
    /// Parse a target argument: `COM<digits>` selects the serial bridge,
    /// a non-negative decimal integer selects an SMBus index.
    pub fn parse(arg: &str) -> Result<Self> {
        if let Some(digits) = arg.strip_prefix("COM") {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return Ok(DeviceTarget::SerialPort {
                    name: arg.to_string(),
                });
            }
            return Err(Error::InvalidArguments(
                "Port name should start with \"COM\" followed by a number.".into(),
            ));
        }
        match arg.parse::<u8>() {
            Ok(index) => Ok(DeviceTarget::Bus { index }),
            Err(_) => Err(Error::InvalidArguments(format!(
                "\"{arg}\" is not a COM port or an SMBus number"
            ))),
        }
    }
}

impl fmt::Display for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceTarget::SerialPort { name } => write!(f, "port {name}"),
            DeviceTarget::Bus { index } => write!(f, "SMBus {index}"),
        }
    }
}

/// 7-bit I2C slave address. SPD EEPROMs respond in the 0x50-0x57 window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cAddress(u8);

impl I2cAddress {
    /// Validate a raw byte as a 7-bit address.
    pub fn new(value: u8) -> Result<Self> {
        if value > 0x7F {
            return Err(Error::InvalidArguments(format!(
                "I2C address {value} is out of range (0-127)"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether the address falls in the SPD EEPROM window (0x50-0x57).
    pub fn is_eeprom(self) -> bool {
        self.0 >> 3 == 0x0A
    }
}

impl fmt::Display for I2cAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw byte access to one SPD EEPROM behind some physical path.
///
/// Implementations own their connection handle; `disconnect` must be
/// idempotent and infallible so the session can call it unconditionally
/// on every exit path. `connect` must be bounded by the backend's
/// configured timeout and report [`Error::Connection`] rather than
/// blocking indefinitely.
pub trait Transport {
    /// Open the underlying connection.
    fn connect(&mut self) -> Result<()>;

    /// Reported firmware version, if this backend carries firmware.
    ///
    /// The host bus controller has none and returns `Ok(None)`; the
    /// session only enforces the minimum-version gate on `Some`.
    fn firmware_version(&mut self) -> Result<Option<FirmwareVersion>> {
        Ok(None)
    }

    /// Close the connection. Idempotent; never fails.
    fn disconnect(&mut self);

    /// Liveness probe.
    fn test(&mut self) -> Result<bool>;

    /// Set the active device address and determine its addressable data
    /// length (generation probing happens here).
    fn select(&mut self, address: I2cAddress) -> Result<()>;

    /// The currently selected device address, if any.
    fn address(&self) -> Option<I2cAddress>;

    /// Addressable SPD data length of the selected device, in bytes.
    fn data_length(&self) -> usize;

    /// Read `buf.len()` bytes starting at `offset`. This is the chunk
    /// primitive the accessor's chunked read is counted in.
    fn read_bytes(&mut self, offset: u16, buf: &mut [u8]) -> Result<()>;

    /// Read one byte.
    fn read_byte(&mut self, offset: u16) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_bytes(offset, &mut buf)?;
        Ok(buf[0])
    }

    /// Write one byte. `Ok(true)` means the device acknowledged.
    fn write_byte(&mut self, offset: u16, value: u8) -> Result<bool>;

    /// Scan the bus for responding EEPROM addresses.
    fn scan_addresses(&mut self) -> Result<Vec<I2cAddress>>;

    /// Human-readable connection description ("COM3:115200", "SMBus 0").
    fn describe(&self) -> String;
}

/// Write-protection and generation probing, available only on backends
/// whose firmware exposes the dedicated commands (the serial bridge; the
/// host bus cannot drive the HV/SA0 strap these operations need).
pub trait ProtectedTransport: Transport {
    fn detect_ddr4(&mut self) -> Result<bool>;
    fn detect_ddr5(&mut self) -> Result<bool>;

    /// Set reversible protection on one block. `Ok(false)` means the
    /// hardware refused (strap not wired, or block already read-only).
    fn set_rswp(&mut self, block: u8) -> Result<bool>;

    /// Clear reversible protection on all blocks.
    fn clear_rswp(&mut self) -> Result<bool>;

    /// Set permanent (irreversible) protection.
    fn set_pswp(&mut self) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serial_target() {
        assert_eq!(
            DeviceTarget::parse("COM5").unwrap(),
            DeviceTarget::SerialPort {
                name: "COM5".into()
            }
        );
    }

    #[test]
    fn parses_bus_target() {
        assert_eq!(
            DeviceTarget::parse("0").unwrap(),
            DeviceTarget::Bus { index: 0 }
        );
    }

    #[test]
    fn rejects_bare_com_prefix() {
        assert!(DeviceTarget::parse("COM").is_err());
        assert!(DeviceTarget::parse("COMx").is_err());
    }

    #[test]
    fn rejects_negative_bus() {
        assert!(DeviceTarget::parse("-1").is_err());
    }

    #[test]
    fn address_range() {
        assert!(I2cAddress::new(127).is_ok());
        assert!(I2cAddress::new(128).is_err());
        assert!(I2cAddress::new(80).unwrap().is_eeprom());
        assert!(!I2cAddress::new(0x48).unwrap().is_eeprom());
    }
}
