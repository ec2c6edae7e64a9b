// libseader-rs/libseader/src/transport/serial.rs

#![cfg(feature = "serial")]

use std::io::{ErrorKind, Read, Write};

use log::debug;
use serialport::SerialPort;

use crate::transport::traits::Transport;
use crate::utils::{DEFAULT_RECEIVE_POLL_MS, ms};
use crate::{Error, Result};

/// Line speed of the SAM reader UART
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

const READ_CHUNK: usize = 256;

/// Serial link to the SAM reader.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open `path` at the reader's default baud rate.
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with_baud(path, DEFAULT_BAUD_RATE)
    }

    pub fn open_with_baud(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(ms(DEFAULT_RECEIVE_POLL_MS))
            .open()?;
        debug!("opened {} at {} baud", path, baud_rate);
        Ok(Self { port })
    }

    /// Names of the serial ports present on this machine
    pub fn available_ports() -> Result<Vec<String>> {
        Ok(serialport::available_ports()?
            .into_iter()
            .map(|p| p.port_name)
            .collect())
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }

    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>> {
        self.port.set_timeout(ms(timeout_ms))?;
        let mut buf = [0u8; READ_CHUNK];
        match self.port.read(&mut buf) {
            Ok(0) => Err(Error::Timeout),
            Ok(n) => Ok(buf[..n].to_vec()),
            Err(e) if e.kind() == ErrorKind::TimedOut => Err(Error::Timeout),
            Err(e) => Err(e.into()),
        }
    }

    fn try_clone(&self) -> Result<Box<dyn Transport>> {
        Ok(Box::new(Self {
            port: self.port.try_clone()?,
        }))
    }
}
