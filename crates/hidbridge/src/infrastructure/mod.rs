//! Infrastructure layer: everything that touches the OS.
//!
//! - **`serial`** – `serialport`-backed line transport and port enumeration.
//! - **`discovery`** – tiered micro:bit port discovery.
//! - **`injection`** – input backends (`enigo` for production, a recording
//!   mock for tests).
//! - **`config`** – TOML config file in the platform config directory.
//!
//! This layer implements the capability traits the application layer
//! defines; nothing above it names `serialport` or `enigo` directly.

pub mod config;
pub mod discovery;
pub mod injection;
pub mod serial;
