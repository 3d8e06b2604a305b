//! Serial transport capability trait.
//!
//! The bridge loop and dispatcher consume the serial link through
//! [`SerialTransport`]; the `serialport`-backed implementation lives in the
//! infrastructure layer and tests script a mock.

use thiserror::Error;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The port could not be opened.
    #[error("failed to open serial port: {0}")]
    Open(String),

    /// The device went away mid-run (read returned end-of-stream).
    #[error("serial device disconnected")]
    Disconnected,

    /// Any other I/O failure on the open port.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one bounded read attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// A complete line, newline-stripped, decoded as UTF-8 with replacement
    /// for invalid bytes (a noisy serial link must never be fatal).
    Line(String),
    /// No complete line arrived within the read timeout. The caller polls
    /// again; the timeout bounds how long a cancellation signal can go
    /// unobserved.
    TimedOut,
}

/// Line-oriented, timeout-bounded serial I/O.
pub trait SerialTransport: Send {
    /// Reads until one full line is buffered or the timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Disconnected`] when the device is gone and
    /// [`TransportError::Io`] for other read failures; both are terminal for
    /// the current run.
    fn read_line(&mut self) -> Result<LineRead, TransportError>;

    /// Writes raw bytes back to the device (used for the PONG heartbeat).
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}
