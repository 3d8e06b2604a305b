//! Parser for the `HID:` line protocol.
//!
//! Wire format, one command per `\n`-terminated ASCII line:
//! ```text
//! HID:<TYPE>:<ACTION>[:<DATA>]
//! ```
//! The remainder after the prefix is split on `:` into at most three fields,
//! so `DATA` may itself contain `:` (needed for typed text like URLs).
//!
//! Lines that do not carry the prefix are not protocol commands at all – the
//! micro:bit shares the serial link with ordinary `print` output – and lines
//! with no `ACTION` field are malformed. Both cases parse to `None`; a
//! malformed command is dropped silently rather than surfaced as an error,
//! because one garbled line must never disturb the read loop.

use tracing::trace;

/// Literal prefix that marks a serial line as a bridge command.
pub const PROTOCOL_PREFIX: &str = "HID:";

/// A single parsed protocol command.
///
/// `kind` and `action` are matched case-insensitively by the dispatcher but
/// stored verbatim, so parsing followed by [`Command::to_line`] reproduces
/// the original fields exactly. Commands are immutable value objects created
/// per line and consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command family: `KEY`, `KEYBOARD`, `MOUSE`, `SYSTEM`, `INIT`, `PING`.
    pub kind: String,
    /// Operation within the family, e.g. `COMBO`, `MOVE`, `PING`.
    pub action: String,
    /// Opaque payload; interpretation depends on (kind, action). Empty when
    /// the line had no third field.
    pub data: String,
}

impl Command {
    /// Renders the command back to its wire form (without the trailing `\n`).
    ///
    /// The `DATA` field is omitted when empty, matching what senders emit for
    /// data-less commands such as `HID:SYSTEM:PING`.
    pub fn to_line(&self) -> String {
        if self.data.is_empty() {
            format!("{}{}:{}", PROTOCOL_PREFIX, self.kind, self.action)
        } else {
            format!("{}{}:{}:{}", PROTOCOL_PREFIX, self.kind, self.action, self.data)
        }
    }
}

/// Parses one newline-stripped serial line into a [`Command`].
///
/// Returns `None` for non-protocol lines (missing `HID:` prefix) and for
/// malformed commands (no `ACTION` field). Never panics, never errors.
pub fn parse_line(line: &str) -> Option<Command> {
    let line = line.trim();

    let rest = line.strip_prefix(PROTOCOL_PREFIX)?;

    // At most 3 fields so the data payload keeps its own colons.
    let mut parts = rest.splitn(3, ':');
    let kind = parts.next()?;
    let action = parts.next()?;
    let data = parts.next().unwrap_or("");

    let command = Command {
        kind: kind.to_string(),
        action: action.to_string(),
        data: data.to_string(),
    };
    trace!(kind = %command.kind, action = %command.action, data = %command.data, "parsed command");
    Some(command)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
