//! # reload-core
//!
//! Core functionality for the reload differential-testing harness.
//!
//! This crate provides:
//! - The typed replay model and its JSON loader
//! - The deterministic frame encoder that rebuilds the per-turn wire message
//! - The divergence detector that compares canonicalized move maps
//! - Run configuration and validation

mod config;
mod divergence;
mod encoder;
mod replay;

pub use config::{ConfigError, RunConfig};
pub use divergence::{BLANK, COLUMN_WIDTH, DivergenceRow, TurnReport, diff_turn};
pub use encoder::{EncodeError, encode_frame};
pub use replay::{
    DockingState, DockingStatus, Frame, MoveSet, PlanetDef, PlanetState, Replay, ReplayError, Ship,
};
