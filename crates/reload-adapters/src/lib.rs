//! # reload-adapters
//!
//! Subprocess adapters for the reload harness.
//!
//! One [`BotSession`] per configured bot: it owns the child process and its
//! line pipes, performs the startup handshake, and runs the per-turn
//! request/response round trips in lockstep with the orchestrator.

mod bot_session;

pub use bot_session::{BotSession, SessionError};
