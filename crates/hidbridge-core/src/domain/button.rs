//! Mouse button identifiers.

/// The mouse buttons addressable by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButtonSymbol {
    Left,
    Right,
    Middle,
}

impl MouseButtonSymbol {
    /// Resolves a button name, case-insensitively. Unknown names yield `None`.
    pub fn resolve(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "LEFT" => Some(MouseButtonSymbol::Left),
            "RIGHT" => Some(MouseButtonSymbol::Right),
            "MIDDLE" => Some(MouseButtonSymbol::Middle),
            _ => None,
        }
    }
}
