//! Input-injection capability trait.
//!
//! The dispatcher talks to the host's input stack exclusively through
//! [`InputInjector`]. The production implementation (`EnigoInjector`) lives
//! in the infrastructure layer; tests use the recording `MockInjector`.

use hidbridge_core::{KeySymbol, MouseButtonSymbol};
use thiserror::Error;

/// Error type for input injection operations.
#[derive(Debug, Error)]
pub enum InjectionError {
    /// The host refused or failed the input event (e.g. missing accessibility
    /// permission, no display server).
    #[error("input injection failed: {0}")]
    Platform(String),
}

/// Host input synthesis, abstracted from any particular injection library.
///
/// Methods take `&mut self` because real backends keep a stateful OS handle.
/// Every call is a single injected event (or batch, for [`type_text`]); the
/// press/hold/combo semantics live in the dispatcher, not here.
///
/// [`type_text`]: InputInjector::type_text
pub trait InputInjector: Send {
    /// Types a literal string, reproducing the exact character sequence.
    fn type_text(&mut self, text: &str) -> Result<(), InjectionError>;

    /// Presses a key without releasing it.
    fn press_key(&mut self, key: KeySymbol) -> Result<(), InjectionError>;

    /// Releases a previously pressed key.
    fn release_key(&mut self, key: KeySymbol) -> Result<(), InjectionError>;

    /// Performs `count` full press+release clicks of a button.
    fn click(&mut self, button: MouseButtonSymbol, count: u32) -> Result<(), InjectionError>;

    /// Presses a mouse button without releasing it.
    fn press_button(&mut self, button: MouseButtonSymbol) -> Result<(), InjectionError>;

    /// Releases a mouse button.
    fn release_button(&mut self, button: MouseButtonSymbol) -> Result<(), InjectionError>;

    /// Moves the pointer by a relative displacement in pixels. No clamping
    /// to screen bounds is performed by the bridge.
    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), InjectionError>;

    /// Current absolute pointer position.
    fn cursor_position(&mut self) -> Result<(i32, i32), InjectionError>;

    /// Scrolls by the given deltas. Positive `dy` scrolls up (away from the
    /// user), matching the sending device's convention.
    fn scroll(&mut self, dx: i32, dy: i32) -> Result<(), InjectionError>;
}
