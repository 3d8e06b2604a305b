//! Recording injector for tests.
//!
//! Captures every injection call into a shared, inspectable log instead of
//! synthesizing real input, and simulates a pointer position so relative
//! moves can be asserted as absolute coordinates. Integration tests clone
//! the handles before boxing the mock into a dispatcher.

use std::sync::{Arc, Mutex};

use hidbridge_core::{KeySymbol, MouseButtonSymbol};

use crate::application::injector::{InjectionError, InputInjector};

/// One recorded injection call, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum InjectedEvent {
    TextTyped(String),
    KeyPressed(KeySymbol),
    KeyReleased(KeySymbol),
    Clicked(MouseButtonSymbol, u32),
    ButtonPressed(MouseButtonSymbol),
    ButtonReleased(MouseButtonSymbol),
    Moved(i32, i32),
    Scrolled(i32, i32),
}

/// Injector that records instead of injecting.
pub struct MockInjector {
    events: Arc<Mutex<Vec<InjectedEvent>>>,
    position: Arc<Mutex<(i32, i32)>>,
    fail_all: bool,
}

impl MockInjector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            position: Arc::new(Mutex::new((0, 0))),
            fail_all: false,
        }
    }

    /// A mock whose every call fails, for error-path tests.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::new()
        }
    }

    /// Shared handle onto the recorded events.
    pub fn events_handle(&self) -> Arc<Mutex<Vec<InjectedEvent>>> {
        Arc::clone(&self.events)
    }

    /// Shared handle onto the simulated pointer position.
    pub fn position_handle(&self) -> Arc<Mutex<(i32, i32)>> {
        Arc::clone(&self.position)
    }

    /// Places the simulated pointer.
    pub fn set_position(&self, x: i32, y: i32) {
        *self.position.lock().unwrap() = (x, y);
    }

    fn record(&mut self, event: InjectedEvent) -> Result<(), InjectionError> {
        if self.fail_all {
            return Err(InjectionError::Platform("mock configured to fail".to_string()));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

impl Default for MockInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl InputInjector for MockInjector {
    fn type_text(&mut self, text: &str) -> Result<(), InjectionError> {
        self.record(InjectedEvent::TextTyped(text.to_string()))
    }

    fn press_key(&mut self, key: KeySymbol) -> Result<(), InjectionError> {
        self.record(InjectedEvent::KeyPressed(key))
    }

    fn release_key(&mut self, key: KeySymbol) -> Result<(), InjectionError> {
        self.record(InjectedEvent::KeyReleased(key))
    }

    fn click(&mut self, button: MouseButtonSymbol, count: u32) -> Result<(), InjectionError> {
        self.record(InjectedEvent::Clicked(button, count))
    }

    fn press_button(&mut self, button: MouseButtonSymbol) -> Result<(), InjectionError> {
        self.record(InjectedEvent::ButtonPressed(button))
    }

    fn release_button(&mut self, button: MouseButtonSymbol) -> Result<(), InjectionError> {
        self.record(InjectedEvent::ButtonReleased(button))
    }

    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), InjectionError> {
        self.record(InjectedEvent::Moved(dx, dy))?;
        let mut pos = self.position.lock().unwrap();
        *pos = (pos.0 + dx, pos.1 + dy);
        Ok(())
    }

    fn cursor_position(&mut self) -> Result<(i32, i32), InjectionError> {
        Ok(*self.position.lock().unwrap())
    }

    fn scroll(&mut self, dx: i32, dy: i32) -> Result<(), InjectionError> {
        self.record(InjectedEvent::Scrolled(dx, dy))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
