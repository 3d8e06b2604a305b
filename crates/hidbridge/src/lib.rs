//! hidbridge library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does hidbridge do? (for beginners)
//!
//! A micro:bit running the companion firmware sends one-line text commands
//! over its USB serial link, for example `HID:MOUSE:MOVE:10.6,-3.2` from an
//! accelerometer-driven tilt controller. This application:
//!
//! 1. Finds the micro:bit's serial port (or uses the one given on the
//!    command line).
//! 2. Opens the port and reads lines in a single synchronous loop.
//! 3. Parses each line into a typed command and dispatches it.
//! 4. Injects the resulting keyboard/mouse events into the host OS.
//! 5. On shutdown – Ctrl-C or connection loss – force-releases everything
//!    still held so no key or mouse button stays stuck down.
//!
//! The bridge is deliberately best-effort: a malformed command, an unknown
//! key name, or a rejected injection is logged and skipped; only losing the
//! serial connection ends a run.

/// Application layer: dispatcher, bridge loop, and the capability traits
/// they consume.
pub mod application;

/// Infrastructure layer: serial transport, port discovery, config file, and
/// input-injection backends.
pub mod infrastructure;
