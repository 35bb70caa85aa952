//! Run configuration for a differential-replay session.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration problems caught before any subprocess is spawned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one bot command is required")]
    NoBots,

    #[error("player id {0} is negative")]
    NegativePlayerId(i64),

    #[error("bot command {0} is empty")]
    EmptyBotCommand(usize),
}

/// Everything a run needs, assembled from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path to the decompressed-JSON replay file.
    pub replay_path: PathBuf,

    /// The player whose recorded moves form the baseline, and whose
    /// perspective the frames are replayed from.
    pub player_id: i64,

    /// One subprocess command per bot under test, in registration order.
    pub bot_commands: Vec<String>,
}

impl RunConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_commands.is_empty() {
            return Err(ConfigError::NoBots);
        }
        if self.player_id < 0 {
            return Err(ConfigError::NegativePlayerId(self.player_id));
        }
        for (index, command) in self.bot_commands.iter().enumerate() {
            if command.trim().is_empty() {
                return Err(ConfigError::EmptyBotCommand(index));
            }
        }
        Ok(())
    }
}
