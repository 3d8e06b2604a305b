//! # hidbridge-core
//!
//! Shared library for the serial HID bridge containing the line protocol
//! parser, key/button symbol resolution, and held-input bookkeeping.
//!
//! This crate is used by the `hidbridge` application. It has zero dependencies
//! on OS APIs, serial ports, or input-injection libraries.
//!
//! # Architecture overview (for beginners)
//!
//! The bridge turns text commands arriving over a USB serial link from a
//! micro:bit into real keyboard and mouse input on the host computer. A
//! command is one line of ASCII text:
//!
//! ```text
//! HID:KEY:COMBO:CTRL+C
//! HID:MOUSE:MOVE:10.6,-3.2
//! ```
//!
//! This crate defines:
//!
//! - **`protocol`** – How a raw line becomes a typed [`Command`] (and how a
//!   `Command` is rendered back to a line, used for the PONG heartbeat and in
//!   tests).
//!
//! - **`domain`** – Pure value types with no OS dependencies: the closed
//!   [`KeySymbol`] variant resolved once at parse time, the
//!   [`MouseButtonSymbol`] set, and the [`HeldSet`] that remembers what is
//!   currently pressed so it can be force-released on shutdown.

pub mod domain;
pub mod protocol;

pub use domain::button::MouseButtonSymbol;
pub use domain::held::HeldSet;
pub use domain::keysym::{KeySymbol, Modifier, SpecialKey};
pub use protocol::line::{parse_line, Command, PROTOCOL_PREFIX};
