//! spdrw-smbus - host SMBus transport over Linux i2c-dev
//!
//! Direct access to SPD EEPROMs through `/dev/i2c-N`. Reads and writes
//! are plain offset-pointer transactions; DDR4 and DDR5 devices larger
//! than one page are handled with the generation's page-select scheme.
//! Bus access requires elevated rights, checked before any device I/O.

pub mod device;

pub use device::SmbusDevice;
