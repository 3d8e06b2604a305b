//! Key symbol resolution.
//!
//! Protocol tokens such as `CTRL`, `F5`, or `a` resolve to a closed
//! [`KeySymbol`] variant. Resolution order matches the combo semantics:
//! modifier lookup first, then special keys, then the single-character
//! literal fallback. Unresolvable tokens yield `None` – never an error –
//! so one bad token inside a combo skips that token only.

/// Modifier keys usable in combos and holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    /// Windows / Super key.
    Win,
    /// macOS Command key.
    Cmd,
}

/// Non-printing special keys addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKey {
    Enter,
    Space,
    Esc,
    Delete,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

/// A key the bridge can press: a modifier, a named special key, or a literal
/// single character.
///
/// Literal characters are stored lowercase; the sender uses TYPE for text
/// that needs exact case, while combo tokens like `CTRL+A` mean the key
/// position, not the shifted character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySymbol {
    Modifier(Modifier),
    Special(SpecialKey),
    Literal(char),
}

impl Modifier {
    /// Resolves a modifier name, case-insensitively.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "CTRL" => Some(Modifier::Ctrl),
            "SHIFT" => Some(Modifier::Shift),
            "ALT" => Some(Modifier::Alt),
            "WIN" => Some(Modifier::Win),
            "CMD" => Some(Modifier::Cmd),
            _ => None,
        }
    }
}

impl SpecialKey {
    /// Resolves a special key name, case-insensitively.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "ENTER" => Some(SpecialKey::Enter),
            "SPACE" => Some(SpecialKey::Space),
            "ESC" => Some(SpecialKey::Esc),
            "DELETE" => Some(SpecialKey::Delete),
            "BACKSPACE" => Some(SpecialKey::Backspace),
            "TAB" => Some(SpecialKey::Tab),
            "UP" => Some(SpecialKey::Up),
            "DOWN" => Some(SpecialKey::Down),
            "LEFT" => Some(SpecialKey::Left),
            "RIGHT" => Some(SpecialKey::Right),
            "HOME" => Some(SpecialKey::Home),
            "END" => Some(SpecialKey::End),
            "PAGE_UP" => Some(SpecialKey::PageUp),
            "PAGE_DOWN" => Some(SpecialKey::PageDown),
            "F1" => Some(SpecialKey::F1),
            "F2" => Some(SpecialKey::F2),
            "F3" => Some(SpecialKey::F3),
            "F4" => Some(SpecialKey::F4),
            "F5" => Some(SpecialKey::F5),
            "F6" => Some(SpecialKey::F6),
            "F7" => Some(SpecialKey::F7),
            "F8" => Some(SpecialKey::F8),
            "F9" => Some(SpecialKey::F9),
            "F10" => Some(SpecialKey::F10),
            "F11" => Some(SpecialKey::F11),
            "F12" => Some(SpecialKey::F12),
            _ => None,
        }
    }
}

impl KeySymbol {
    /// Resolves one protocol token to a key symbol.
    ///
    /// Lookup order: modifier names, then special-key names, then the
    /// single-character literal fallback (lowercased). Pure and total over
    /// the one-character case; multi-character tokens that match no name
    /// resolve to `None`.
    pub fn resolve(token: &str) -> Option<Self> {
        let token = token.trim();

        if let Some(modifier) = Modifier::from_token(token) {
            return Some(KeySymbol::Modifier(modifier));
        }
        if let Some(special) = SpecialKey::from_token(token) {
            return Some(KeySymbol::Special(special));
        }

        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySymbol::Literal(c.to_ascii_lowercase())),
            _ => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
