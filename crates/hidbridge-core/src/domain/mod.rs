//! Pure domain types: key symbols, mouse buttons, and held-input bookkeeping.
//!
//! Nothing in this module touches the OS. Symbols are resolved from protocol
//! tokens exactly once and carried as closed tagged variants, independent of
//! whatever key representation the injection backend uses.

pub mod button;
pub mod held;
pub mod keysym;
