//! # reload-proto
//!
//! The move-command grammar shared by every part of the reload harness.
//!
//! This crate provides:
//! - [`Move`] — the canonical tagged union of per-ship commands
//! - [`MoveMap`] — a per-turn mapping from ship id to canonical command text
//! - [`Order`] — the structured move record as stored in replay files
//! - [`ParseError`] — typed failures for malformed move input
//!
//! Both ingestion modes (a bot's raw reply line and the replay's recorded
//! order records) funnel through the same encode function, so equivalent
//! commands always compare equal as text.

mod error;
mod moves;

pub use error::ParseError;
pub use moves::{Move, MoveMap, Order};
