//! spdrw-bridge - serial microcontroller bridge transport
//!
//! Talks to the SPD reader/writer firmware over a serial port using a
//! single-letter command protocol with fixed-size responses. The bridge
//! is the only backend that can drive the HV/SA0 strap, so it also
//! carries the write-protection and generation-detect commands.

pub mod device;
pub mod protocol;

pub use device::{BridgeDevice, SerialSettings};
