//! Input-injection backends.
//!
//! - **`enigo_backend`** – production implementation over the cross-platform
//!   `enigo` crate.
//! - **`mock`** – recording implementation for integration tests and dry
//!   runs; captures every event instead of touching the OS.

pub mod enigo_backend;
pub mod mock;

pub use enigo_backend::EnigoInjector;
pub use mock::{InjectedEvent, MockInjector};
