//! Application layer for the bridge.
//!
//! - **`injector`** – the [`InputInjector`](injector::InputInjector)
//!   capability trait the dispatcher presses keys and buttons through. The
//!   real backend lives in the infrastructure layer; tests use a recording
//!   mock.
//!
//! - **`transport`** – the [`SerialTransport`](transport::SerialTransport)
//!   capability trait for line-oriented serial I/O.
//!
//! - **`dispatch`** – routes parsed commands to the keyboard, mouse, or
//!   system handler and owns the held-input state.
//!
//! - **`bridge`** – the read-parse-dispatch loop with its lifecycle state
//!   machine and exactly-once cleanup.
//!
//! **Dependency rule**: this layer depends only on `hidbridge_core`; it must
//! not import from `infrastructure`.

pub mod bridge;
pub mod dispatch;
pub mod injector;
pub mod transport;
