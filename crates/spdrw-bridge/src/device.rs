//! Bridge device over a serial port

use crate::protocol::{self, cmd};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use spdrw_core::error::{Error, Result};
use spdrw_core::spd::{self, RamType};
use spdrw_core::transport::{FirmwareVersion, I2cAddress, ProtectedTransport, Transport};
use std::io::{Read, Write};
use std::time::Duration;

/// Serial line settings for the bridge.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub dtr: bool,
    pub rts: bool,
    pub timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            dtr: true,
            rts: true,
            timeout: Duration::from_secs(10),
        }
    }
}

/// A serial-attached SPD reader/writer bridge.
pub struct BridgeDevice {
    port_name: String,
    settings: SerialSettings,
    port: Option<Box<dyn SerialPort>>,
    address: Option<I2cAddress>,
    data_length: usize,
}

impl BridgeDevice {
    pub fn new(port_name: impl Into<String>, settings: SerialSettings) -> Self {
        Self {
            port_name: port_name.into(),
            settings,
            port: None,
            address: None,
            data_length: 0,
        }
    }

    /// Probe all serial ports for a responding bridge and return the
    /// names that answered the communication test.
    pub fn discover(settings: &SerialSettings) -> Vec<String> {
        let ports = match serialport::available_ports() {
            Ok(ports) => ports,
            Err(e) => {
                log::warn!("could not enumerate serial ports: {e}");
                return Vec::new();
            }
        };

        let mut found = Vec::new();
        for info in ports {
            let mut device = BridgeDevice::new(info.port_name.as_str(), settings.clone());
            let responded = device.connect().is_ok() && device.test().unwrap_or(false);
            device.disconnect();
            if responded {
                found.push(info.port_name);
            } else {
                log::debug!("no bridge on {}", info.port_name);
            }
        }
        found
    }

    fn connection_error(&self, reason: impl ToString) -> Error {
        Error::Connection {
            target: self.port_name.clone(),
            reason: reason.to_string(),
        }
    }

    /// Send a request and read the exact response length.
    fn exchange(&mut self, request: &[u8], response: &mut [u8]) -> Result<()> {
        let port = self
            .port
            .as_mut()
            .ok_or_else(|| Error::Connection {
                target: self.port_name.clone(),
                reason: "not connected".into(),
            })?;
        port.write_all(request)
            .and_then(|_| port.flush())
            .and_then(|_| port.read_exact(response))
            .map_err(|e| Error::Connection {
                target: self.port_name.clone(),
                reason: e.to_string(),
            })
    }

    fn exchange_bool(&mut self, request: &[u8]) -> Result<bool> {
        let mut response = [0u8; 1];
        self.exchange(request, &mut response)?;
        Ok(response[0] != 0)
    }

    fn selected(&self) -> Result<I2cAddress> {
        self.address.ok_or_else(|| {
            Error::InvalidArguments("no I2C address selected".into())
        })
    }

    fn read_raw(&mut self, address: I2cAddress, offset: u16, buf: &mut [u8]) -> Result<()> {
        let request = [
            cmd::READ,
            address.value(),
            (offset >> 8) as u8,
            offset as u8,
            buf.len() as u8,
        ];
        self.exchange(&request, buf)
            .map_err(|_| Error::ReadFailure { offset })
    }
}

impl Transport for BridgeDevice {
    fn connect(&mut self) -> Result<()> {
        if self.port.is_some() {
            return Ok(());
        }
        let mut port = serialport::new(&self.port_name, self.settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.settings.timeout)
            .open()
            .map_err(|e| self.connection_error(e))?;
        port.write_data_terminal_ready(self.settings.dtr)
            .map_err(|e| self.connection_error(e))?;
        port.write_request_to_send(self.settings.rts)
            .map_err(|e| self.connection_error(e))?;

        log::info!(
            "opened {} at {} baud",
            self.port_name,
            self.settings.baud_rate
        );
        self.port = Some(port);
        Ok(())
    }

    fn firmware_version(&mut self) -> Result<Option<FirmwareVersion>> {
        let mut response = [0u8; 4];
        self.exchange(&[cmd::VERSION], &mut response)?;
        let version = FirmwareVersion(u32::from_be_bytes(response));
        log::debug!("{} reports firmware {}", self.port_name, version);
        Ok(Some(version))
    }

    fn disconnect(&mut self) {
        if self.port.take().is_some() {
            log::debug!("closed {}", self.port_name);
        }
        self.address = None;
        self.data_length = 0;
    }

    fn test(&mut self) -> Result<bool> {
        self.exchange_bool(&[cmd::TEST])
    }

    fn select(&mut self, address: I2cAddress) -> Result<()> {
        self.address = Some(address);
        self.data_length = if address.is_eeprom() {
            if self.detect_ddr5()? {
                RamType::Ddr5.spd_size()
            } else if self.detect_ddr4()? {
                RamType::Ddr4.spd_size()
            } else {
                let mut code = [0u8; 1];
                self.read_raw(address, 2, &mut code)?;
                match RamType::from_code(code[0]).spd_size() {
                    0 => spd::MINIMUM_SIZE,
                    size => size,
                }
            }
        } else {
            spd::MINIMUM_SIZE
        };
        log::debug!(
            "selected address {} on {} ({} bytes)",
            address,
            self.port_name,
            self.data_length
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
        self.read_raw(address, offset, buf)
    }

    fn write_byte(&mut self, offset: u16, value: u8) -> Result<bool> {
        let address = self.selected()?;
        let request = [
            cmd::WRITE,
            address.value(),
            (offset >> 8) as u8,
            offset as u8,
            value,
        ];
        self.exchange_bool(&request)
            .map_err(|_| Error::WriteFailure {
                offset,
                address: address.value(),
                port: self.describe(),
            })
    }

    fn scan_addresses(&mut self) -> Result<Vec<I2cAddress>> {
        let mut mask = [0u8; 1];
        self.exchange(&[cmd::SCAN], &mut mask)?;
        Ok(protocol::addresses_from_mask(mask[0]))
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.port_name, self.settings.baud_rate)
    }
}

impl ProtectedTransport for BridgeDevice {
    fn detect_ddr4(&mut self) -> Result<bool> {
        let address = self.selected()?;
        self.exchange_bool(&[cmd::DDR4_DETECT, address.value()])
    }

    fn detect_ddr5(&mut self) -> Result<bool> {
        let address = self.selected()?;
        self.exchange_bool(&[cmd::DDR5_DETECT, address.value()])
    }

    fn set_rswp(&mut self, block: u8) -> Result<bool> {
        let address = self.selected()?;
        self.exchange_bool(&[cmd::RSWP, address.value(), block, protocol::ENABLE])
    }

    fn clear_rswp(&mut self) -> Result<bool> {
        let address = self.selected()?;
        self.exchange_bool(&[cmd::RSWP, address.value(), 0, protocol::DISABLE])
    }

    fn set_pswp(&mut self) -> Result<bool> {
        let address = self.selected()?;
        self.exchange_bool(&[cmd::PSWP, address.value(), protocol::ENABLE])
    }
}
