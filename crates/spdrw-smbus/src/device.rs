//! SMBus device over Linux i2c-dev

use spdrw_core::error::{Error, Result};
use spdrw_core::spd::{self, RamType};
use spdrw_core::transport::{I2cAddress, Transport};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// DDR5 SPD hub addresses mirror the EEPROM window at 0x48-0x4F.
const DDR5_HUB_BASE: u8 = 0x48;
/// DDR5 hub register that selects the addressed page.
const DDR5_PAGE_REGISTER: u8 = 0x0B;
/// DDR4 set-page-address slaves (SPA0/SPA1); a bare write flips the page.
const SPA_BASE: u8 = 0x36;
/// First address of the SPD EEPROM window.
const FIRST_EEPROM_ADDRESS: u8 = 0x50;

mod ioctl {
    // Force slave addressing even when a kernel driver (at24/ee1004)
    // owns the address, which is the norm for SPD EEPROMs.
    nix::ioctl_write_int_bad!(i2c_slave_force, 0x0706);
}

/// One SMBus controller selected by index (`/dev/i2c-N`).
pub struct SmbusDevice {
    bus: u8,
    file: Option<File>,
    address: Option<I2cAddress>,
    data_length: usize,
    ddr5: bool,
    current_page: Option<u8>,
    slave: Option<u8>,
}

impl SmbusDevice {
    pub fn new(bus: u8) -> Self {
        Self {
            bus,
            file: None,
            address: None,
            data_length: 0,
            ddr5: false,
            current_page: None,
            slave: None,
        }
    }

    /// Enumerate available SMBus indices from `/dev/i2c-*`.
    pub fn discover_buses() -> Result<Vec<u8>> {
        let dev = Path::new("/dev");
        let entries = std::fs::read_dir(dev).map_err(|source| Error::FileIo {
            path: dev.to_path_buf(),
            source,
        })?;

        let mut buses: Vec<u8> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| name.strip_prefix("i2c-"))
                    .and_then(|index| index.parse::<u8>().ok())
            })
            .collect();
        buses.sort_unstable();
        Ok(buses)
    }

    /// Bus access needs elevated rights; fail before touching the device.
    pub fn require_privileges() -> Result<()> {
        if nix::unistd::Uid::effective().is_root() {
            Ok(())
        } else {
            Err(Error::PrivilegeRequired)
        }
    }

    fn dev_path(&self) -> String {
        format!("/dev/i2c-{}", self.bus)
    }

    fn file(&mut self) -> Result<&mut File> {
        let target = self.describe();
        self.file.as_mut().ok_or(Error::Connection {
            target,
            reason: "not connected".into(),
        })
    }

    fn set_slave(&mut self, slave: u8) -> Result<()> {
        if self.slave == Some(slave) {
            return Ok(());
        }
        let target = self.describe();
        let fd = self.file()?.as_raw_fd();
        unsafe { ioctl::i2c_slave_force(fd, slave as libc::c_int) }.map_err(|e| {
            Error::Connection {
                target,
                reason: format!("I2C_SLAVE ioctl: {e}"),
            }
        })?;
        self.slave = Some(slave);
        Ok(())
    }

    /// Whether any device acknowledges a read at `slave`.
    fn probe(&mut self, slave: u8) -> bool {
        if self.set_slave(slave).is_err() {
            return false;
        }
        let mut byte = [0u8; 1];
        self.file
            .as_mut()
            .map(|f| f.read_exact(&mut byte).is_ok())
            .unwrap_or(false)
    }

    fn selected(&self) -> Result<I2cAddress> {
        self.address
            .ok_or_else(|| Error::InvalidArguments("no I2C address selected".into()))
    }

    fn page_for(&self, offset: u16) -> u8 {
        (offset >> if self.ddr5 { 7 } else { 8 }) as u8
    }

    fn mapped_offset(&self, offset: u16) -> u8 {
        if self.ddr5 {
            ((offset % 128) as u8) | 0x80
        } else {
            offset as u8
        }
    }

    fn switch_page(&mut self, address: I2cAddress, page: u8) -> Result<()> {
        if self.ddr5 {
            self.set_slave(address.value())?;
            self.file()?
                .write_all(&[DDR5_PAGE_REGISTER, page])
                .map_err(|e| Error::Connection {
                    target: format!("SMBus {}", self.bus),
                    reason: format!("page select: {e}"),
                })?;
        } else {
            // SPA writes are not acknowledged with data; the transfer
            // itself performs the switch
            self.set_slave(SPA_BASE + page)?;
            let _ = self.file()?.write(&[0]);
            self.slave = None;
        }
        self.current_page = Some(page);
        Ok(())
    }

    /// Map an offset to its in-page form, switching pages when needed.
    fn prepare(&mut self, offset: u16) -> Result<u8> {
        if self.ddr5 || self.data_length > 256 {
            let page = self.page_for(offset);
            if self.current_page != Some(page) {
                let address = self.selected()?;
                self.switch_page(address, page)?;
            }
        }
        Ok(self.mapped_offset(offset))
    }

    fn read_generation_byte(&mut self, address: I2cAddress) -> Result<u8> {
        self.set_slave(address.value())?;
        let file = self.file()?;
        let mut byte = [0u8; 1];
        file.write_all(&[2])
            .and_then(|_| file.read_exact(&mut byte))
            .map_err(|_| Error::ReadFailure { offset: 2 })?;
        Ok(byte[0])
    }
}

impl Transport for SmbusDevice {
    fn connect(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        Self::require_privileges()?;
        let path = self.dev_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => Error::PrivilegeRequired,
                _ => Error::Connection {
                    target: self.describe(),
                    reason: e.to_string(),
                },
            })?;
        log::info!("opened {path}");
        self.file = Some(file);
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.file.take().is_some() {
            log::debug!("closed {}", self.dev_path());
        }
        self.address = None;
        self.data_length = 0;
        self.ddr5 = false;
        self.current_page = None;
        self.slave = None;
    }

    fn test(&mut self) -> Result<bool> {
        // controller liveness, not device presence: the addressing ioctl
        // must succeed even when no EEPROM answers
        self.slave = None;
        Ok(self.set_slave(FIRST_EEPROM_ADDRESS).is_ok())
    }

    fn select(&mut self, address: I2cAddress) -> Result<()> {
        self.address = Some(address);
        self.current_page = None;
        self.data_length = 0;
        self.ddr5 = address.is_eeprom() && self.probe(DDR5_HUB_BASE | (address.value() & 0x07));

        let length = if self.ddr5 {
            RamType::Ddr5.spd_size()
        } else if address.is_eeprom() {
            let code = self.read_generation_byte(address)?;
            match RamType::from_code(code).spd_size() {
                0 => spd::MINIMUM_SIZE,
                size => size,
            }
        } else {
            spd::MINIMUM_SIZE
        };
        self.data_length = length;
        log::debug!(
            "selected address {} on SMBus {} ({} bytes)",
            address,
            self.bus,
            length
        );
        Ok(())
    }

    fn address(&self) -> Option<I2cAddress> {
        self.address
    }

    fn data_length(&self) -> usize {
        self.data_length
    }

    fn read_bytes(&mut self, offset: u16, buf: &mut [u8]) -> Result<()> {
        let address = self.selected()?;
        for (i, slot) in buf.iter_mut().enumerate() {
            let current = offset + i as u16;
            let mapped = self.prepare(current)?;
            self.set_slave(address.value())?;
            let file = self.file()?;
            file.write_all(&[mapped])
                .and_then(|_| file.read_exact(std::slice::from_mut(slot)))
                .map_err(|_| Error::ReadFailure { offset: current })?;
        }
        Ok(())
    }

    fn write_byte(&mut self, offset: u16, value: u8) -> Result<bool> {
        let address = self.selected()?;
        let mapped = self.prepare(offset)?;
        self.set_slave(address.value())?;
        // a NACK surfaces as a failed transfer
        Ok(self.file()?.write_all(&[mapped, value]).is_ok())
    }

    fn scan_addresses(&mut self) -> Result<Vec<I2cAddress>> {
        let mut found = Vec::new();
        for slot in 0..8 {
            let slave = FIRST_EEPROM_ADDRESS + slot;
            if self.probe(slave) {
                found.push(I2cAddress::new(slave)?);
            }
        }
        Ok(found)
    }

    fn describe(&self) -> String {
        format!("SMBus {}", self.bus)
    }
}
