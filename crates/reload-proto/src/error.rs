//! Error types for the move-command grammar.

use thiserror::Error;

/// Failures while turning move input into a [`crate::MoveMap`].
///
/// The harness never recovers from these: a reply that does not parse means
/// the bot (or the replay) is broken, and the run aborts so the problem is
/// debuggable rather than papered over.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown move command `{0}`")]
    UnknownCommand(String),

    #[error("incomplete `{command}` command at end of line")]
    Incomplete { command: String },

    #[error("`{value}` is not a valid integer for {field}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("recorded `{kind}` order for ship {ship_id} is missing `{field}`")]
    MissingField {
        kind: String,
        ship_id: i64,
        field: &'static str,
    },
}
