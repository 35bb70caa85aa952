//! Deterministic wire encoding of one replay turn.
//!
//! The encoded message is the exact game-state line a bot would have received
//! at that point in the original match. Token order is part of the protocol:
//! players, ships, and planets are always emitted in ascending numeric id
//! order, so encoding the same turn twice yields byte-identical output no
//! matter how the underlying maps iterate.

use std::collections::HashMap;

use thiserror::Error;

use crate::replay::{DockingStatus, PlanetState, Replay, Ship};

/// Errors while encoding a frame.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("replay has no frame {0}")]
    MissingFrame(usize),

    #[error("frame contains non-numeric {what} id `{key}`")]
    BadId { what: &'static str, key: String },

    #[error("frame references planet {id} with no definition in the replay header")]
    UnknownPlanet { id: usize },

    #[error("ship {ship} docking record is missing `{field}`")]
    MissingDockingField { ship: String, field: &'static str },
}

/// Encodes the game-state message for one turn.
///
/// Tokens are joined by single spaces; the newline terminator is the session
/// writer's job.
pub fn encode_frame(replay: &Replay, turn: usize) -> Result<String, EncodeError> {
    let frame = replay
        .frames
        .get(turn)
        .ok_or(EncodeError::MissingFrame(turn))?;

    let mut tokens: Vec<String> = Vec::new();

    let players = sorted_by_numeric_key(&frame.ships, "player")?;
    tokens.push(players.len().to_string());
    for (_, player_key, ships) in &players {
        let ships = sorted_by_numeric_key(ships, "ship")?;
        tokens.push((*player_key).to_string());
        tokens.push(ships.len().to_string());
        for (_, _, ship) in &ships {
            push_ship(&mut tokens, ship)?;
        }
    }

    let planets = sorted_by_numeric_key(&frame.planets, "planet")?;
    tokens.push(planets.len().to_string());
    for (_, _, planet) in &planets {
        push_planet(&mut tokens, planet, replay)?;
    }

    Ok(tokens.join(" "))
}

/// Map entries sorted by the numeric value of their text key.
///
/// Ids arrive as JSON object keys, i.e. non-zero-padded numeric strings; a
/// lexicographic sort would put "10" before "2".
fn sorted_by_numeric_key<'a, T>(
    map: &'a HashMap<String, T>,
    what: &'static str,
) -> Result<Vec<(i64, &'a str, &'a T)>, EncodeError> {
    let mut entries = Vec::with_capacity(map.len());
    for (key, value) in map {
        let id: i64 = key.parse().map_err(|_| EncodeError::BadId {
            what,
            key: key.clone(),
        })?;
        entries.push((id, key.as_str(), value));
    }
    entries.sort_by_key(|(id, _, _)| *id);
    Ok(entries)
}

fn push_ship(tokens: &mut Vec<String>, ship: &Ship) -> Result<(), EncodeError> {
    for value in [
        &ship.id,
        &ship.x,
        &ship.y,
        &ship.health,
        &ship.vel_x,
        &ship.vel_y,
    ] {
        tokens.push(value.to_string());
    }

    let status = ship.docking.status;
    tokens.push(status.code().to_string());

    if status == DockingStatus::Undocked {
        tokens.push("0".to_string());
    } else {
        let planet = ship.docking.planet_id.as_ref().ok_or_else(|| {
            EncodeError::MissingDockingField {
                ship: ship.id.to_string(),
                field: "planet_id",
            }
        })?;
        tokens.push(planet.to_string());
    }

    if matches!(status, DockingStatus::Docking | DockingStatus::Undocking) {
        let turns_left = ship.docking.turns_left.as_ref().ok_or_else(|| {
            EncodeError::MissingDockingField {
                ship: ship.id.to_string(),
                field: "turns_left",
            }
        })?;
        tokens.push(turns_left.to_string());
    } else {
        tokens.push("0".to_string());
    }

    // Reserved padding field.
    tokens.push("0".to_string());

    Ok(())
}

fn push_planet(
    tokens: &mut Vec<String>,
    planet: &PlanetState,
    replay: &Replay,
) -> Result<(), EncodeError> {
    let index = planet
        .id
        .as_u64()
        .and_then(|id| usize::try_from(id).ok())
        .ok_or_else(|| EncodeError::BadId {
            what: "planet",
            key: planet.id.to_string(),
        })?;

    // Static attributes never change over a match, so they come from the
    // replay header; the frame only carries the dynamic ones.
    let def = replay
        .planets
        .get(index)
        .ok_or(EncodeError::UnknownPlanet { id: index })?;

    tokens.push(planet.id.to_string());
    tokens.push(def.x.to_string());
    tokens.push(def.y.to_string());
    tokens.push(planet.health.to_string());
    tokens.push(def.r.to_string());
    tokens.push(def.docking_spots.to_string());
    tokens.push(planet.current_production.to_string());
    tokens.push(planet.remaining_production.to_string());

    match &planet.owner {
        None => {
            tokens.push("0".to_string());
            tokens.push("0".to_string());
        }
        Some(owner) => {
            tokens.push("1".to_string());
            tokens.push(owner.to_string());
        }
    }

    tokens.push(planet.docked_ships.len().to_string());
    for ship_id in &planet.docked_ships {
        // Source order preserved.
        tokens.push(ship_id.to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Replay {
        serde_json::from_value(serde_json::json!({
            "width": 384,
            "height": 256,
            "num_frames": 2,
            "planets": [{"x": 100.5, "y": 50.25, "r": 5.0, "docking_spots": 2}],
            "frames": [
                {
                    "ships": {
                        "0": {
                            "2": {
                                "id": 2, "x": 10.0, "y": 20.0, "health": 255,
                                "vel_x": 0.0, "vel_y": 0.0,
                                "docking": {"status": "undocked"}
                            },
                            "10": {
                                "id": 10, "x": 30.5, "y": 40.5, "health": 200,
                                "vel_x": -1.5, "vel_y": 2.0,
                                "docking": {"status": "docking", "planet_id": 0, "turns_left": 4}
                            }
                        },
                        "1": {
                            "3": {
                                "id": 3, "x": 5.0, "y": 6.0, "health": 100,
                                "vel_x": 0.0, "vel_y": 0.0,
                                "docking": {"status": "docked", "planet_id": 0}
                            }
                        }
                    },
                    "planets": {"0": {
                        "id": 0, "health": 500, "owner": null,
                        "current_production": 10, "remaining_production": 990,
                        "docked_ships": [3]
                    }}
                },
                {"ships": {}, "planets": {}}
            ],
            "moves": []
        }))
        .unwrap()
    }

    #[test]
    fn test_encode_fixed_layout() {
        let encoded = encode_frame(&fixture(), 0).unwrap();
        assert_eq!(
            encoded,
            "2 \
             0 2 \
             2 10.0 20.0 255 0.0 0.0 0 0 0 0 \
             10 30.5 40.5 200 -1.5 2.0 1 0 4 0 \
             1 1 \
             3 5.0 6.0 100 0.0 0.0 2 0 0 0 \
             1 \
             0 100.5 50.25 500 5.0 2 10 990 0 0 1 3"
        );
    }

    #[test]
    fn test_encode_numeric_ship_sort() {
        // Ship id 10 must come after 2; a lexicographic key sort would
        // reverse them.
        let encoded = encode_frame(&fixture(), 0).unwrap();
        let ten = encoded.find(" 10 30.5").unwrap();
        let two = encoded.find(" 2 10.0").unwrap();
        assert!(two < ten);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let replay = fixture();
        assert_eq!(
            encode_frame(&replay, 0).unwrap(),
            encode_frame(&replay, 0).unwrap()
        );
    }

    #[test]
    fn test_encode_empty_frame() {
        let encoded = encode_frame(&fixture(), 1).unwrap();
        assert_eq!(encoded, "0 0");
    }

    #[test]
    fn test_encode_owned_planet() {
        let mut replay = fixture();
        let planet = replay.frames[0].planets.get_mut("0").unwrap();
        planet.owner = Some(serde_json::Number::from(1));

        let encoded = encode_frame(&replay, 0).unwrap();
        assert!(encoded.ends_with("10 990 1 1 1 3"));
    }

    #[test]
    fn test_encode_missing_frame() {
        let err = encode_frame(&fixture(), 9).unwrap_err();
        assert!(matches!(err, EncodeError::MissingFrame(9)));
    }

    #[test]
    fn test_encode_unknown_planet() {
        let mut replay = fixture();
        replay.planets.clear();

        let err = encode_frame(&replay, 0).unwrap_err();
        assert!(matches!(err, EncodeError::UnknownPlanet { id: 0 }));
    }

    #[test]
    fn test_encode_missing_docking_planet() {
        let mut replay = fixture();
        replay.frames[0]
            .ships
            .get_mut("1")
            .unwrap()
            .get_mut("3")
            .unwrap()
            .docking
            .planet_id = None;

        let err = encode_frame(&replay, 0).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::MissingDockingField { field: "planet_id", .. }
        ));
    }
}
