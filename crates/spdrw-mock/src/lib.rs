//! spdrw-mock - In-memory SPD EEPROM emulator
//!
//! Emulates one EEPROM behind the transport traits, without hardware.
//! Failure injection (stale firmware, dead liveness probe, write NACK at
//! a chosen offset, refused protection blocks) plus read/write call
//! counters make the orchestration layer's guarantees directly
//! observable in tests.

use spdrw_core::error::{Error, Result};
use spdrw_core::spd::RamType;
use spdrw_core::transport::{
    FirmwareVersion, I2cAddress, ProtectedTransport, Transport, REQUIRED_FIRMWARE_VERSION,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Number of RSWP blocks the emulator tracks (DDR5 maximum).
const BLOCKS: usize = 16;

/// In-memory EEPROM emulator.
#[derive(Debug)]
pub struct MockEeprom {
    data: Vec<u8>,
    firmware: FirmwareVersion,
    responsive: bool,
    connected: bool,
    address: Option<I2cAddress>,
    scan_result: Vec<I2cAddress>,
    rswp: [bool; BLOCKS],
    rswp_refused: [bool; BLOCKS],
    clear_refused: bool,
    pswp: bool,
    pswp_refused: bool,
    nack_at: Option<u16>,
    /// Chunk reads issued through `read_bytes`
    reads: Arc<AtomicUsize>,
    /// Byte writes issued through `write_byte`
    writes: Arc<AtomicUsize>,
    disconnects: Arc<AtomicUsize>,
}

impl MockEeprom {
    /// Create an emulator with a blank EEPROM of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size],
            firmware: REQUIRED_FIRMWARE_VERSION,
            responsive: true,
            connected: false,
            address: None,
            scan_result: vec![I2cAddress::new(0x50).unwrap()],
            rswp: [false; BLOCKS],
            rswp_refused: [false; BLOCKS],
            clear_refused: false,
            pswp: false,
            pswp_refused: false,
            nack_at: None,
            reads: Arc::new(AtomicUsize::new(0)),
            writes: Arc::new(AtomicUsize::new(0)),
            disconnects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create an emulator pre-filled with `image`; the EEPROM capacity
    /// equals the image length.
    pub fn with_image(image: &[u8]) -> Self {
        let mut mock = Self::new(image.len());
        mock.data.copy_from_slice(image);
        mock
    }

    pub fn with_firmware(mut self, version: u32) -> Self {
        self.firmware = FirmwareVersion(version);
        self
    }

    pub fn unresponsive(mut self) -> Self {
        self.responsive = false;
        self
    }

    /// Inject a write NACK at `offset`.
    pub fn nack_at(mut self, offset: u16) -> Self {
        self.nack_at = Some(offset);
        self
    }

    /// Make the hardware refuse RSWP on one block.
    pub fn refuse_block(mut self, block: u8) -> Self {
        self.rswp_refused[block as usize] = true;
        self
    }

    pub fn refuse_clear(mut self) -> Self {
        self.clear_refused = true;
        self
    }

    pub fn refuse_pswp(mut self) -> Self {
        self.pswp_refused = true;
        self
    }

    pub fn with_scan_result(mut self, addresses: Vec<I2cAddress>) -> Self {
        self.scan_result = addresses;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn rswp_state(&self) -> &[bool; BLOCKS] {
        &self.rswp
    }

    pub fn pswp_state(&self) -> bool {
        self.pswp
    }

    /// Counter handles survive moving the mock into a session.
    pub fn read_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.reads)
    }

    pub fn write_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.writes)
    }

    pub fn disconnect_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.disconnects)
    }

    fn ram_type(&self) -> RamType {
        RamType::from_image(&self.data)
    }
}

impl Transport for MockEeprom {
    fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    fn firmware_version(&mut self) -> Result<Option<FirmwareVersion>> {
        Ok(Some(self.firmware))
    }

    fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn test(&mut self) -> Result<bool> {
        Ok(self.responsive)
    }

    fn select(&mut self, address: I2cAddress) -> Result<()> {
        self.address = Some(address);
        Ok(())
    }

    fn address(&self) -> Option<I2cAddress> {
        self.address
    }

    fn data_length(&self) -> usize {
        self.data.len()
    }

    fn read_bytes(&mut self, offset: u16, buf: &mut [u8]) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let start = offset as usize;
        let end = start + buf.len();
        if end > self.data.len() {
            return Err(Error::ReadFailure { offset });
        }
        buf.copy_from_slice(&self.data[start..end]);
        Ok(())
    }

    fn write_byte(&mut self, offset: u16, value: u8) -> Result<bool> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.nack_at == Some(offset) {
            return Ok(false);
        }
        let index = offset as usize;
        if index >= self.data.len() {
            return Ok(false);
        }
        self.data[index] = value;
        Ok(true)
    }

    fn scan_addresses(&mut self) -> Result<Vec<I2cAddress>> {
        Ok(self.scan_result.clone())
    }

    fn describe(&self) -> String {
        "MOCK:115200".to_string()
    }
}

impl ProtectedTransport for MockEeprom {
    fn detect_ddr4(&mut self) -> Result<bool> {
        Ok(self.ram_type() == RamType::Ddr4)
    }

    fn detect_ddr5(&mut self) -> Result<bool> {
        Ok(self.ram_type() == RamType::Ddr5)
    }

    fn set_rswp(&mut self, block: u8) -> Result<bool> {
        let index = block as usize % BLOCKS;
        if self.rswp_refused[index] || self.rswp[index] {
            return Ok(false);
        }
        self.rswp[index] = true;
        Ok(true)
    }

    fn clear_rswp(&mut self) -> Result<bool> {
        if self.clear_refused {
            return Ok(false);
        }
        self.rswp = [false; BLOCKS];
        Ok(true)
    }

    fn set_pswp(&mut self) -> Result<bool> {
        if self.pswp_refused || self.pswp {
            return Ok(false);
        }
        self.pswp = true;
        Ok(true)
    }
}
