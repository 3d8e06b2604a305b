//! Protocol module containing the line-oriented command format.

pub mod line;

pub use line::{parse_line, Command, PROTOCOL_PREFIX};
