//! `serialport`-backed implementation of the transport trait, plus port
//! enumeration for discovery and `--list-ports`.
//!
//! Reads are chunked into an internal buffer and handed out one line at a
//! time, so a single 1 Hz poll tick can drain a burst of queued commands
//! without losing partial lines across ticks. A read timeout is a normal
//! poll tick, not an error; a zero-byte read means the device unplugged.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};
use tracing::debug;

use crate::application::transport::{LineRead, SerialTransport, TransportError};

/// Line-buffered serial transport over a real port.
pub struct SerialLineTransport {
    port: Box<dyn SerialPort>,
    buffer: Vec<u8>,
}

impl SerialLineTransport {
    /// Opens `path` at `baud` with the given read timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Open`] when the port cannot be opened
    /// (missing device, permissions, port busy).
    pub fn open(path: &str, baud: u32, timeout: Duration) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud)
            .timeout(timeout)
            .open()
            .map_err(|e| TransportError::Open(format!("{path}: {e}")))?;
        debug!(path, baud, "serial port opened");
        Ok(Self {
            port,
            buffer: Vec::new(),
        })
    }

    /// Pops one complete line out of the buffer, if any, stripping the
    /// newline and any trailing carriage return.
    fn take_buffered_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut raw: Vec<u8> = self.buffer.drain(..=pos).collect();
        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        // A noisy link must never be fatal: invalid UTF-8 becomes U+FFFD and
        // the resulting line simply fails to parse as a command.
        Some(String::from_utf8_lossy(&raw).into_owned())
    }
}

impl SerialTransport for SerialLineTransport {
    fn read_line(&mut self) -> Result<LineRead, TransportError> {
        loop {
            if let Some(line) = self.take_buffered_line() {
                return Ok(LineRead::Line(line));
            }

            let mut chunk = [0u8; 256];
            match self.port.read(&mut chunk) {
                // End-of-stream on a serial port means the device is gone.
                Ok(0) => return Err(TransportError::Disconnected),
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    // Partial data stays buffered for the next tick.
                    return Ok(LineRead::TimedOut);
                }
                Err(e) => return Err(TransportError::Io(e)),
            }
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }
}

// ── Port enumeration ──────────────────────────────────────────────────────────

/// One enumerated serial port, reduced to the fields discovery matches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    /// OS device path, e.g. `/dev/ttyACM0` or `COM4`.
    pub device: String,
    /// Human-readable product description, when the OS knows one.
    pub description: Option<String>,
    /// USB `(vendor, product)` ID pair for USB-attached ports.
    pub usb_id: Option<(u16, u16)>,
}

/// Enumerates the serial ports the OS currently knows about.
///
/// # Errors
///
/// Returns the underlying enumeration failure; callers treat this the same
/// as an empty port list plus a logged warning.
pub fn list_ports() -> Result<Vec<PortDescriptor>, serialport::Error> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|p| {
            let (description, usb_id) = match p.port_type {
                SerialPortType::UsbPort(usb) => (usb.product, Some((usb.vid, usb.pid))),
                _ => (None, None),
            };
            PortDescriptor {
                device: p.port_name,
                description,
                usb_id,
            }
        })
        .collect())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
