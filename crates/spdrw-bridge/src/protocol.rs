//! Wire protocol for the bridge firmware
//!
//! Every exchange is one single-letter command byte plus fixed-size
//! arguments, answered by a fixed-size response. Boolean responses are
//! one byte, nonzero meaning true.

use spdrw_core::transport::I2cAddress;

/// Command bytes understood by the firmware.
pub mod cmd {
    /// Communication test; answers an ack byte
    pub const TEST: u8 = b't';
    /// Firmware version; answers a 4-byte big-endian date code
    pub const VERSION: u8 = b'v';
    /// `READ addr offMSB offLSB count`; answers `count` data bytes
    pub const READ: u8 = b'r';
    /// `WRITE addr offMSB offLSB value`; answers an ack byte
    pub const WRITE: u8 = b'w';
    /// Bus scan; answers a bitmask of responding EEPROM addresses
    pub const SCAN: u8 = b's';
    /// `PROBE addr`; answers an ack byte
    pub const PROBE: u8 = b'a';
    /// `DDR4_DETECT addr`; answers a presence byte
    pub const DDR4_DETECT: u8 = b'4';
    /// `DDR5_DETECT addr`; answers a presence byte
    pub const DDR5_DETECT: u8 = b'5';
    /// `RSWP addr block flag`; flag 1 sets, 0 clears
    pub const RSWP: u8 = b'b';
    /// `PSWP addr flag`; flag 1 sets the irreversible lock
    pub const PSWP: u8 = b'l';
}

/// Flag argument that enables (sets) the addressed state.
pub const ENABLE: u8 = 1;
/// Flag argument that disables (clears) the addressed state.
pub const DISABLE: u8 = 0;

/// First address of the SPD EEPROM window.
pub const FIRST_EEPROM_ADDRESS: u8 = 0x50;

/// Decode the scan response: bit `n` set means an EEPROM answered at
/// address `0x50 + n`.
pub fn addresses_from_mask(mask: u8) -> Vec<I2cAddress> {
    (0..8)
        .filter(|bit| mask & (1 << bit) != 0)
        .filter_map(|bit| I2cAddress::new(FIRST_EEPROM_ADDRESS + bit).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mask_means_no_devices() {
        assert!(addresses_from_mask(0).is_empty());
    }

    #[test]
    fn mask_bits_map_to_eeprom_window() {
        let addresses = addresses_from_mask(0b1000_0001);
        let values: Vec<u8> = addresses.iter().map(|a| a.value()).collect();
        assert_eq!(values, vec![0x50, 0x57]);
    }
}
