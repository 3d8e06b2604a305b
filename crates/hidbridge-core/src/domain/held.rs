//! Bookkeeping for currently-held input symbols.
//!
//! The dispatcher records every HOLD here so the matching releases can be
//! issued later – explicitly by a RELEASE command, or wholesale during
//! shutdown so no key or button stays stuck down after the bridge exits.
//!
//! Invariant: a symbol is in the set iff a HOLD was issued for it and no
//! matching release has happened since.

/// An insertion-ordered set of held symbols.
///
/// Backed by a `Vec` rather than a hash set so that [`HeldSet::release_all`]
/// can return the symbols in reverse hold order – the same ordering rule
/// combos use, releasing the most recently pressed symbol first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldSet<T> {
    items: Vec<T>,
}

impl<T: PartialEq + Copy> HeldSet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Records a symbol as held. Holding an already-held symbol is a no-op,
    /// keeping the set consistent with a single outstanding press.
    pub fn hold(&mut self, symbol: T) {
        if !self.items.contains(&symbol) {
            self.items.push(symbol);
        }
    }

    /// Removes a held symbol, returning `true` if it was present.
    /// Releasing a symbol that was never held is a no-op, not an error.
    pub fn release(&mut self, symbol: T) -> bool {
        match self.items.iter().position(|held| *held == symbol) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Clears the set and returns what was held, most recently held first.
    ///
    /// The caller issues the matching injection release calls. Safe to call
    /// on an empty set (returns an empty vec).
    pub fn release_all(&mut self) -> Vec<T> {
        let mut cleared = std::mem::take(&mut self.items);
        cleared.reverse();
        cleared
    }

    /// Whether the symbol is currently held.
    pub fn contains(&self, symbol: T) -> bool {
        self.items.contains(&symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
