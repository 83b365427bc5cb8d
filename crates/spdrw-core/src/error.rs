//! Error types shared across the workspace

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by command parsing, device access and file handling.
///
/// Validation errors are raised before any device I/O is attempted.
/// Device-I/O errors abort the current operation immediately; the EEPROM
/// offers no transactional rollback, so no partial-state repair is done.
#[derive(Debug, Error)]
pub enum Error {
    /// Command arguments failed shape validation
    #[error("{0}")]
    InvalidArguments(String),

    /// Command verb is not recognized
    #[error("Unknown command line parameters.")]
    UnknownCommand(String),

    /// Failed to reach the device within the transport timeout
    #[error("Could not connect to the device on {target}: {reason}")]
    Connection { target: String, reason: String },

    /// Bridge firmware is older than the required minimum
    #[error("The device on port {port} requires its firmware to be updated (found {found}, need {required})")]
    FirmwareOutdated {
        port: String,
        found: u32,
        required: u32,
    },

    /// Liveness probe failed on an otherwise reachable device
    #[error("The device on {target} does not respond")]
    DeviceUnresponsive { target: String },

    /// A chunked read failed; the whole read is aborted
    #[error("Unable to read byte 0x{offset:04X}")]
    ReadFailure { offset: u16 },

    /// A byte write was not acknowledged; bytes written so far remain
    #[error("Could not write byte {offset} to EEPROM at address {address} on port {port}")]
    WriteFailure {
        offset: u16,
        address: u8,
        port: String,
    },

    /// Image failed structural checks (size or SPD content)
    #[error("{0}")]
    Validation(String),

    /// Protection block index outside the generation's legal range
    #[error("{0}")]
    Range(String),

    #[error("Unable to clear write protection")]
    ProtectionClearFailure,

    #[error("Unable to set permanent write protection on {port}:{address}")]
    PermanentProtectionFailure { port: String, address: u8 },

    #[error("No EEPROM devices found.")]
    NoDevicesFound,

    #[error("{path}: {source}")]
    FileIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Host bus access needs elevated rights
    #[error("Administrative privileges required")]
    PrivilegeRequired,
}

/// Result type alias using the shared error type
pub type Result<T> = std::result::Result<T, Error>;
