//! SPD image model
//!
//! RAM generation codes, per-generation SPD sizes and the structural
//! checks an image must pass before a verified write. The generation is
//! always derived from content (byte 2 of the image) or device probing,
//! never supplied by the user.

use core::fmt;

/// Smallest SPD EEPROM size; used as the addressing fallback when the
/// generation cannot be determined.
pub const MINIMUM_SIZE: usize = 256;

/// DRAM generation, per the JEDEC device-type byte (SPD byte 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamType {
    Unknown,
    Sdram,
    Ddr,
    Ddr2,
    Ddr2FbDimm,
    Ddr3,
    Ddr4,
    Ddr4e,
    Lpddr3,
    Lpddr4,
    Lpddr4x,
    Ddr5,
    Lpddr5,
}

impl RamType {
    /// Decode the JEDEC device-type byte. Unassigned codes map to
    /// `Unknown`.
    pub fn from_code(code: u8) -> Self {
        match code {
            4 => RamType::Sdram,
            7 => RamType::Ddr,
            8 => RamType::Ddr2,
            9 => RamType::Ddr2FbDimm,
            11 => RamType::Ddr3,
            12 => RamType::Ddr4,
            14 => RamType::Ddr4e,
            15 => RamType::Lpddr3,
            16 => RamType::Lpddr4,
            17 => RamType::Lpddr4x,
            18 => RamType::Ddr5,
            19 => RamType::Lpddr5,
            _ => RamType::Unknown,
        }
    }

    /// Derive the generation from image content (byte 2).
    pub fn from_image(image: &[u8]) -> Self {
        if image.len() < 3 {
            return RamType::Unknown;
        }
        Self::from_code(image[2])
    }

    /// SPD data length for this generation; 0 when unknown.
    pub fn spd_size(self) -> usize {
        match self {
            RamType::Sdram
            | RamType::Ddr
            | RamType::Ddr2
            | RamType::Ddr2FbDimm
            | RamType::Ddr3 => 256,
            RamType::Ddr4 | RamType::Ddr4e | RamType::Lpddr3 | RamType::Lpddr4 => 512,
            RamType::Ddr5 => 1024,
            _ => 0,
        }
    }
}

impl fmt::Display for RamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RamType::Unknown => "Unknown",
            RamType::Sdram => "SDRAM",
            RamType::Ddr => "DDR",
            RamType::Ddr2 => "DDR2",
            RamType::Ddr2FbDimm => "DDR2 FB-DIMM",
            RamType::Ddr3 => "DDR3",
            RamType::Ddr4 => "DDR4",
            RamType::Ddr4e => "DDR4E",
            RamType::Lpddr3 => "LPDDR3",
            RamType::Lpddr4 => "LPDDR4",
            RamType::Lpddr4x => "LPDDR4X",
            RamType::Ddr5 => "DDR5",
            RamType::Lpddr5 => "LPDDR5",
        };
        f.write_str(name)
    }
}

/// Structural check for a memory-profile image: the length must be a
/// known SPD size and agree with the generation encoded in the image.
pub fn validate(image: &[u8]) -> bool {
    match image.len() {
        256 => matches!(
            RamType::from_image(image),
            RamType::Ddr3 | RamType::Ddr2 | RamType::Ddr | RamType::Sdram
        ),
        512 => RamType::from_image(image) == RamType::Ddr4,
        1024 => RamType::from_image(image) == RamType::Ddr5,
        _ => false,
    }
}
