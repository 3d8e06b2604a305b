//! `enigo`-backed input injection.
//!
//! Translates the bridge's key and button symbols into `enigo` events. The
//! only semantic adjustment made here is the vertical scroll sign: the
//! protocol treats positive as "up, away from the user" while `enigo`
//! scrolls down for positive lengths, so the delta is negated on the way
//! through.

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use hidbridge_core::{KeySymbol, Modifier, MouseButtonSymbol, SpecialKey};
use tracing::debug;

use crate::application::injector::{InjectionError, InputInjector};

/// Production injector over a stateful `enigo` handle.
pub struct EnigoInjector {
    enigo: Enigo,
}

impl EnigoInjector {
    /// Connects to the host input stack.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError::Platform`] when the backend cannot start,
    /// e.g. no display server or missing accessibility permission.
    pub fn new() -> Result<Self, InjectionError> {
        let enigo = Enigo::new(&Settings::default()).map_err(platform)?;
        debug!("input injection backend ready");
        Ok(Self { enigo })
    }
}

fn platform<E: std::fmt::Display>(e: E) -> InjectionError {
    InjectionError::Platform(e.to_string())
}

/// Maps a protocol key symbol onto the corresponding `enigo` key.
fn to_enigo_key(key: KeySymbol) -> Key {
    match key {
        KeySymbol::Modifier(m) => match m {
            Modifier::Ctrl => Key::Control,
            Modifier::Shift => Key::Shift,
            Modifier::Alt => Key::Alt,
            // WIN and CMD are the same key seen from different desks.
            Modifier::Win | Modifier::Cmd => Key::Meta,
        },
        KeySymbol::Special(s) => match s {
            SpecialKey::Enter => Key::Return,
            SpecialKey::Space => Key::Space,
            SpecialKey::Esc => Key::Escape,
            SpecialKey::Delete => Key::Delete,
            SpecialKey::Backspace => Key::Backspace,
            SpecialKey::Tab => Key::Tab,
            SpecialKey::Up => Key::UpArrow,
            SpecialKey::Down => Key::DownArrow,
            SpecialKey::Left => Key::LeftArrow,
            SpecialKey::Right => Key::RightArrow,
            SpecialKey::Home => Key::Home,
            SpecialKey::End => Key::End,
            SpecialKey::PageUp => Key::PageUp,
            SpecialKey::PageDown => Key::PageDown,
            SpecialKey::F1 => Key::F1,
            SpecialKey::F2 => Key::F2,
            SpecialKey::F3 => Key::F3,
            SpecialKey::F4 => Key::F4,
            SpecialKey::F5 => Key::F5,
            SpecialKey::F6 => Key::F6,
            SpecialKey::F7 => Key::F7,
            SpecialKey::F8 => Key::F8,
            SpecialKey::F9 => Key::F9,
            SpecialKey::F10 => Key::F10,
            SpecialKey::F11 => Key::F11,
            SpecialKey::F12 => Key::F12,
        },
        KeySymbol::Literal(c) => Key::Unicode(c),
    }
}

fn to_enigo_button(button: MouseButtonSymbol) -> Button {
    match button {
        MouseButtonSymbol::Left => Button::Left,
        MouseButtonSymbol::Right => Button::Right,
        MouseButtonSymbol::Middle => Button::Middle,
    }
}

impl InputInjector for EnigoInjector {
    fn type_text(&mut self, text: &str) -> Result<(), InjectionError> {
        self.enigo.text(text).map_err(platform)
    }

    fn press_key(&mut self, key: KeySymbol) -> Result<(), InjectionError> {
        self.enigo
            .key(to_enigo_key(key), Direction::Press)
            .map_err(platform)
    }

    fn release_key(&mut self, key: KeySymbol) -> Result<(), InjectionError> {
        self.enigo
            .key(to_enigo_key(key), Direction::Release)
            .map_err(platform)
    }

    fn click(&mut self, button: MouseButtonSymbol, count: u32) -> Result<(), InjectionError> {
        let button = to_enigo_button(button);
        for _ in 0..count {
            self.enigo.button(button, Direction::Click).map_err(platform)?;
        }
        Ok(())
    }

    fn press_button(&mut self, button: MouseButtonSymbol) -> Result<(), InjectionError> {
        self.enigo
            .button(to_enigo_button(button), Direction::Press)
            .map_err(platform)
    }

    fn release_button(&mut self, button: MouseButtonSymbol) -> Result<(), InjectionError> {
        self.enigo
            .button(to_enigo_button(button), Direction::Release)
            .map_err(platform)
    }

    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), InjectionError> {
        self.enigo
            .move_mouse(dx, dy, Coordinate::Rel)
            .map_err(platform)
    }

    fn cursor_position(&mut self) -> Result<(i32, i32), InjectionError> {
        self.enigo.location().map_err(platform)
    }

    fn scroll(&mut self, dx: i32, dy: i32) -> Result<(), InjectionError> {
        if dy != 0 {
            // Protocol positive = up; enigo positive = down.
            self.enigo.scroll(-dy, Axis::Vertical).map_err(platform)?;
        }
        if dx != 0 {
            self.enigo.scroll(dx, Axis::Horizontal).map_err(platform)?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
