//! spdrw-core - SPD EEPROM device-access orchestration
//!
//! This crate contains the transport-independent core of the SPD
//! reader/writer: the transport capability traits, the scoped device
//! session, the chunked read / verified-write accessor, the SPD image
//! model, and the RSWP block manager.
//!
//! Physical backends live in their own crates (`spdrw-bridge` for the
//! serial microcontroller bridge, `spdrw-smbus` for the host SMBus
//! controller) and plug in through the [`transport::Transport`] trait.

pub mod eeprom;
pub mod error;
pub mod rswp;
pub mod session;
pub mod spd;
pub mod transport;

pub use error::{Error, Result};
pub use session::Session;
pub use transport::{
    DeviceTarget, FirmwareVersion, I2cAddress, ProtectedTransport, Transport,
    REQUIRED_FIRMWARE_VERSION,
};
