//! Command dispatcher: routes parsed commands to the keyboard, mouse, or
//! system handler and owns the held-input state.
//!
//! The dispatcher is where the per-action semantics live – tap vs. hold vs.
//! combo vs. typed text – while the [`InputInjector`] only knows how to emit
//! single events. Failures are explicit [`DispatchError`] values at every
//! boundary; [`CommandDispatcher::dispatch`] aggregates and logs them so a
//! malformed or hardware-rejected command never terminates the read loop,
//! while [`CommandDispatcher::try_dispatch`] keeps the failure paths visible
//! to tests.
//!
//! # Held-input variant
//!
//! This bridge implements the legacy protocol variant: held *keys* are
//! tracked alongside held mouse buttons, so `KEY:HOLD` / `KEY:RELEASE` are
//! fully supported and shutdown can force-release both sets. There is no
//! hybrid behavior.

use hidbridge_core::{Command, HeldSet, KeySymbol, MouseButtonSymbol};
use thiserror::Error;
use tracing::debug;

use crate::application::injector::{InjectionError, InputInjector};
use crate::application::transport::SerialTransport;

/// Reply written back to the device for each `PING`.
pub const PONG_RESPONSE: &[u8] = b"HID:PONG\n";

/// Error type for command handling. Every variant is recovered at the
/// `dispatch` boundary; none interrupts the bridge loop.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A key token resolved to no symbol (PRESS/SPECIAL only; combos skip
    /// bad tokens instead).
    #[error("unresolvable key token: {0:?}")]
    UnknownKey(String),

    /// A mouse button name matched none of LEFT/RIGHT/MIDDLE.
    #[error("unknown mouse button: {0:?}")]
    UnknownButton(String),

    /// The data payload did not parse for this action.
    #[error("invalid payload for {action}: {data:?}")]
    InvalidPayload { action: String, data: String },

    /// The host refused an injected event.
    #[error(transparent)]
    Injection(#[from] InjectionError),
}

/// Rounds to the nearest integer, ties away from zero (`10.6 → 11`,
/// `-3.2 → -3`, `0.5 → 1`, `-0.5 → -1`). This is the rule `f64::round`
/// implements; the test suite pins it.
fn round_half_away(value: f64) -> i32 {
    value.round() as i32
}

/// Routes commands and tracks held input.
///
/// Mutated only here; the bridge loop reads and clears the held sets
/// wholesale during shutdown via [`CommandDispatcher::release_everything`].
pub struct CommandDispatcher {
    injector: Box<dyn InputInjector>,
    held_keys: HeldSet<KeySymbol>,
    held_buttons: HeldSet<MouseButtonSymbol>,
}

impl CommandDispatcher {
    /// Creates a dispatcher around the given injection backend.
    pub fn new(injector: Box<dyn InputInjector>) -> Self {
        Self {
            injector,
            held_keys: HeldSet::new(),
            held_buttons: HeldSet::new(),
        }
    }

    /// Currently-held keys (legacy variant bookkeeping).
    pub fn held_keys(&self) -> &HeldSet<KeySymbol> {
        &self.held_keys
    }

    /// Currently-held mouse buttons.
    pub fn held_buttons(&self) -> &HeldSet<MouseButtonSymbol> {
        &self.held_buttons
    }

    /// Handles one command, swallowing and logging any failure.
    ///
    /// This is the entry point the bridge loop uses: protocol errors and
    /// injection refusals are logged at debug level and the loop moves on.
    pub fn dispatch(&mut self, command: &Command, transport: &mut dyn SerialTransport) {
        if let Err(e) = self.try_dispatch(command, transport) {
            debug!(
                kind = %command.kind,
                action = %command.action,
                error = %e,
                "command failed"
            );
        }
    }

    /// Handles one command, returning the explicit failure if any.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the payload is invalid, a symbol is
    /// unresolvable, or the injection backend refuses an event.
    pub fn try_dispatch(
        &mut self,
        command: &Command,
        transport: &mut dyn SerialTransport,
    ) -> Result<(), DispatchError> {
        let kind = command.kind.to_ascii_uppercase();
        let action = command.action.to_ascii_uppercase();
        let data = command.data.as_str();

        match kind.as_str() {
            "KEY" | "KEYBOARD" => self.handle_keyboard(&action, data),
            // Legacy firmware routed keyboard commands under INIT, except the
            // INIT:INIT handshake itself which is a system command.
            "INIT" => {
                if action == "INIT" {
                    self.handle_system(&action, transport)
                } else {
                    self.handle_keyboard(&action, data)
                }
            }
            "MOUSE" => self.handle_mouse(&action, data),
            "SYSTEM" | "PING" => self.handle_system(&action, transport),
            _ => {
                debug!(kind = %command.kind, "ignoring unrecognized command type");
                Ok(())
            }
        }
    }

    // ── Keyboard handler ──────────────────────────────────────────────────────

    fn handle_keyboard(&mut self, action: &str, data: &str) -> Result<(), DispatchError> {
        match action {
            // KEY is the legacy spelling of TYPE.
            "TYPE" | "KEY" => Ok(self.injector.type_text(data)?),
            "PRESS" | "SPECIAL" => {
                let key = KeySymbol::resolve(data)
                    .ok_or_else(|| DispatchError::UnknownKey(data.to_string()))?;
                self.injector.press_key(key)?;
                self.injector.release_key(key)?;
                Ok(())
            }
            "COMBO" => self.press_combo(data, false),
            "HOLD" => self.press_combo(data, true),
            "RELEASE" => self.release_held_keys(),
            _ => {
                debug!(action, "ignoring unknown keyboard action");
                Ok(())
            }
        }
    }

    /// Presses the resolvable tokens of `data` (split on `+`) left to right.
    ///
    /// For a plain combo the symbols are then released in strict reverse
    /// order – last pressed, first released – which is what makes nested
    /// modifier chords like `CTRL+SHIFT+ESC` come apart correctly. For a
    /// hold, each pressed symbol is recorded for a later `RELEASE`.
    fn press_combo(&mut self, data: &str, hold: bool) -> Result<(), DispatchError> {
        let symbols: Vec<KeySymbol> = data
            .split('+')
            .filter_map(|token| {
                let resolved = KeySymbol::resolve(token);
                if resolved.is_none() {
                    debug!(token, "skipping unresolvable combo token");
                }
                resolved
            })
            .collect();

        for &symbol in &symbols {
            self.injector.press_key(symbol)?;
            if hold {
                self.held_keys.hold(symbol);
            }
        }

        if !hold {
            for &symbol in symbols.iter().rev() {
                self.injector.release_key(symbol)?;
            }
        }
        Ok(())
    }

    /// Releases every held key, most recently held first, and clears the set.
    ///
    /// Best-effort: a refused release does not stop the remaining releases;
    /// the first failure is reported after all have been attempted.
    fn release_held_keys(&mut self) -> Result<(), DispatchError> {
        let mut first_error = None;
        for key in self.held_keys.release_all() {
            if let Err(e) = self.injector.release_key(key) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    // ── Mouse handler ─────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, action: &str, data: &str) -> Result<(), DispatchError> {
        match action {
            "MOVE" => {
                let (dx, dy) = parse_move_payload(data).ok_or_else(|| {
                    DispatchError::InvalidPayload {
                        action: "MOVE".to_string(),
                        data: data.to_string(),
                    }
                })?;
                // Relative displacement; applied to wherever the pointer is
                // right now, with no clamping to screen bounds.
                Ok(self
                    .injector
                    .move_by(round_half_away(dx), round_half_away(dy))?)
            }
            "CLICK" => {
                let button = MouseButtonSymbol::resolve(data)
                    .ok_or_else(|| DispatchError::UnknownButton(data.to_string()))?;
                Ok(self.injector.click(button, 1)?)
            }
            "DOUBLE_CLICK" => Ok(self.injector.click(MouseButtonSymbol::Left, 2)?),
            "SCROLL" => {
                let amount: i32 = data.trim().parse().map_err(|_| {
                    DispatchError::InvalidPayload {
                        action: "SCROLL".to_string(),
                        data: data.to_string(),
                    }
                })?;
                // Positive scrolls up (away from the user), per the device.
                Ok(self.injector.scroll(0, amount)?)
            }
            "HOLD" => {
                let button = MouseButtonSymbol::resolve(data)
                    .ok_or_else(|| DispatchError::UnknownButton(data.to_string()))?;
                self.injector.press_button(button)?;
                self.held_buttons.hold(button);
                Ok(())
            }
            "RELEASE" => {
                if data.trim().eq_ignore_ascii_case("ALL") {
                    return self.release_held_buttons();
                }
                let button = MouseButtonSymbol::resolve(data)
                    .ok_or_else(|| DispatchError::UnknownButton(data.to_string()))?;
                // Releasing a button that was never held is a no-op.
                if self.held_buttons.release(button) {
                    self.injector.release_button(button)?;
                }
                Ok(())
            }
            _ => {
                debug!(action, "ignoring unknown mouse action");
                Ok(())
            }
        }
    }

    /// Releases every held mouse button and empties the set, best-effort.
    fn release_held_buttons(&mut self) -> Result<(), DispatchError> {
        let mut first_error = None;
        for button in self.held_buttons.release_all() {
            if let Err(e) = self.injector.release_button(button) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    // ── System handler ────────────────────────────────────────────────────────

    fn handle_system(
        &mut self,
        action: &str,
        transport: &mut dyn SerialTransport,
    ) -> Result<(), DispatchError> {
        if action == "PING" {
            // Best-effort heartbeat: a failed write is logged and forgotten,
            // and the next PING gets a fresh attempt.
            if let Err(e) = transport.write_all(PONG_RESPONSE) {
                debug!(error = %e, "pong write failed");
            }
        }
        // All other system actions are reserved no-ops.
        Ok(())
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────

    /// Force-releases everything still held. Called exactly once during
    /// cleanup; each release is attempted independently and failures are
    /// only logged, since there is nothing better to do on the way out.
    pub fn release_everything(&mut self) {
        for key in self.held_keys.release_all() {
            if let Err(e) = self.injector.release_key(key) {
                debug!(?key, error = %e, "failed to release held key during cleanup");
            }
        }
        for button in self.held_buttons.release_all() {
            if let Err(e) = self.injector.release_button(button) {
                debug!(?button, error = %e, "failed to release held button during cleanup");
            }
        }
    }
}

/// Parses a `"<dx>,<dy>"` payload as floating point (accelerometer-driven
/// senders emit fractional deltas).
fn parse_move_payload(data: &str) -> Option<(f64, f64)> {
    let (dx, dy) = data.split_once(',')?;
    Some((dx.trim().parse().ok()?, dy.trim().parse().ok()?))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
