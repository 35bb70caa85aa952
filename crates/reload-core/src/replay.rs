//! Typed model of a decompressed-JSON replay file.
//!
//! The replay is loaded once and owned by the orchestrator for the whole run.
//! Numeric leaf values that pass straight through to the wire (coordinates,
//! health, production) are carried as [`serde_json::Number`] so the encoder
//! re-renders the source notation instead of forcing everything through a
//! float round-trip.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use serde_json::Number;
use thiserror::Error;
use tracing::debug;

use reload_proto::Order;

/// Errors while loading or indexing a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("replay file {path} is not valid replay JSON: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("replay has no recorded moves for turn {turn}")]
    MissingTurn { turn: usize },

    #[error("replay has no recorded moves for player {player_id} at turn {turn}")]
    MissingPlayer { player_id: i64, turn: usize },
}

/// Recorded orders for one player on one turn, keyed by ship id.
pub type MoveSet = HashMap<String, Order>;

/// A complete recorded match.
#[derive(Debug, Clone, Deserialize)]
pub struct Replay {
    pub width: Number,
    pub height: Number,
    pub num_frames: usize,

    /// Static planet definitions; the list index is the planet id.
    pub planets: Vec<PlanetDef>,

    pub frames: Vec<Frame>,

    /// Per turn: player id -> recorded move sets for that player.
    pub moves: Vec<HashMap<String, Vec<MoveSet>>>,
}

impl Replay {
    /// Loads a replay from a decompressed-JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let file = File::open(path).map_err(|source| ReplayError::Io {
            path: shown.clone(),
            source,
        })?;
        let replay: Replay =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ReplayError::Json {
                path: shown.clone(),
                source,
            })?;

        debug!(
            path = %shown,
            frames = replay.frames.len(),
            planets = replay.planets.len(),
            "loaded replay"
        );
        Ok(replay)
    }

    /// Number of turns the harness replays. Every frame except the last has
    /// a recorded move set following it.
    pub fn turn_count(&self) -> usize {
        self.num_frames.saturating_sub(1)
    }

    /// The tracked player's recorded orders for one turn.
    pub fn recorded_moves(&self, turn: usize, player_id: i64) -> Result<&MoveSet, ReplayError> {
        let per_player = self
            .moves
            .get(turn)
            .ok_or(ReplayError::MissingTurn { turn })?;
        per_player
            .get(&player_id.to_string())
            .and_then(|sets| sets.first())
            .ok_or(ReplayError::MissingPlayer { player_id, turn })
    }
}

/// One recorded game step.
#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    /// Player id -> ship id -> ship state. Ids arrive as JSON object keys,
    /// i.e. text.
    pub ships: HashMap<String, HashMap<String, Ship>>,

    /// Planet id -> per-turn planet state.
    pub planets: HashMap<String, PlanetState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ship {
    pub id: Number,
    pub x: Number,
    pub y: Number,
    pub health: Number,
    pub vel_x: Number,
    pub vel_y: Number,
    pub docking: DockingState,
}

/// Docking sub-record of a ship. `planet_id` and `turns_left` are only
/// present in the JSON when the status requires them.
#[derive(Debug, Clone, Deserialize)]
pub struct DockingState {
    pub status: DockingStatus,
    pub planet_id: Option<Number>,
    pub turns_left: Option<Number>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockingStatus {
    Undocked,
    Docking,
    Docked,
    Undocking,
}

impl DockingStatus {
    /// Wire code for the status token.
    pub fn code(self) -> u8 {
        match self {
            DockingStatus::Undocked => 0,
            DockingStatus::Docking => 1,
            DockingStatus::Docked => 2,
            DockingStatus::Undocking => 3,
        }
    }
}

/// Per-turn planet state. Static attributes live in [`PlanetDef`].
#[derive(Debug, Clone, Deserialize)]
pub struct PlanetState {
    pub id: Number,
    pub health: Number,
    pub owner: Option<Number>,
    pub current_production: Number,
    pub remaining_production: Number,
    pub docked_ships: Vec<Number>,
}

/// Static planet attributes from the replay header.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanetDef {
    pub x: Number,
    pub y: Number,
    pub r: Number,
    pub docking_spots: Number,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn minimal_replay() -> serde_json::Value {
        serde_json::json!({
            "width": 384,
            "height": 256,
            "num_frames": 2,
            "planets": [{"x": 100.5, "y": 50.25, "r": 5.0, "docking_spots": 2}],
            "frames": [
                {
                    "ships": {"0": {"1": {
                        "id": 1, "x": 10.0, "y": 20.0, "health": 255,
                        "vel_x": 0.0, "vel_y": 0.0,
                        "docking": {"status": "undocked"}
                    }}},
                    "planets": {"0": {
                        "id": 0, "health": 500, "owner": null,
                        "current_production": 0, "remaining_production": 990,
                        "docked_ships": []
                    }}
                },
                {"ships": {}, "planets": {}}
            ],
            "moves": [
                {"0": [{"1": {"type": "undock", "shipId": 1}}]}
            ]
        })
    }

    #[test]
    fn test_from_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", minimal_replay()).unwrap();

        let replay = Replay::from_file(file.path()).unwrap();
        assert_eq!(replay.num_frames, 2);
        assert_eq!(replay.turn_count(), 1);
        assert_eq!(replay.frames.len(), 2);
        assert_eq!(replay.planets.len(), 1);
    }

    #[test]
    fn test_from_file_missing() {
        let err = Replay::from_file("/nonexistent/replay.json").unwrap_err();
        assert!(matches!(err, ReplayError::Io { .. }));
    }

    #[test]
    fn test_from_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Replay::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ReplayError::Json { .. }));
    }

    #[test]
    fn test_recorded_moves_lookup() {
        let replay: Replay = serde_json::from_value(minimal_replay()).unwrap();

        let moves = replay.recorded_moves(0, 0).unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves["1"].kind, "undock");
    }

    #[test]
    fn test_recorded_moves_missing_player() {
        let replay: Replay = serde_json::from_value(minimal_replay()).unwrap();

        let err = replay.recorded_moves(0, 7).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::MissingPlayer { player_id: 7, turn: 0 }
        ));
    }

    #[test]
    fn test_recorded_moves_missing_turn() {
        let replay: Replay = serde_json::from_value(minimal_replay()).unwrap();

        let err = replay.recorded_moves(5, 0).unwrap_err();
        assert!(matches!(err, ReplayError::MissingTurn { turn: 5 }));
    }

    #[test]
    fn test_docking_status_codes() {
        assert_eq!(DockingStatus::Undocked.code(), 0);
        assert_eq!(DockingStatus::Docking.code(), 1);
        assert_eq!(DockingStatus::Docked.code(), 2);
        assert_eq!(DockingStatus::Undocking.code(), 3);
    }

    #[test]
    fn test_docking_status_parses_lowercase() {
        let status: DockingStatus = serde_json::from_value(serde_json::json!("undocking")).unwrap();
        assert_eq!(status, DockingStatus::Undocking);
    }
}
