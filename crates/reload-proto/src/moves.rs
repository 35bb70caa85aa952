//! Canonical move commands and the two ingestion modes that produce them.
//!
//! A bot's reply line (`"t 12 7 90 u 13"`) and the replay's recorded order
//! records must canonicalize to identical strings for equivalent commands,
//! because divergence detection is pure text equality. Both paths build
//! [`Move`] values and render them through the single [`Move::canonical`]
//! encoder.
//!
//! One quirk is preserved deliberately: a thrust angle is reduced modulo 360
//! only when its source is non-negative (`"370"` becomes `"10"`, `"-10"`
//! passes through untouched). The recordings were produced with exactly this
//! asymmetry, and comparison depends on bit-for-bit parity with them.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ParseError;

/// A recorded move as stored in a replay's `moves` array.
///
/// Field presence depends on the order type: `angle` and `magnitude` for
/// thrust, `planet_id` for dock. Undock carries only the ship id.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    /// Order type tag (`"undock"`, `"thrust"`, `"dock"`).
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(rename = "shipId")]
    pub ship_id: i64,

    pub angle: Option<i64>,
    pub magnitude: Option<i64>,
    pub planet_id: Option<i64>,
}

/// One ship's command for one turn.
///
/// Fields hold the exact tokens that appear in the canonical text. Stream
/// input keeps its tokens verbatim (aside from the angle rewrite), so a
/// magnitude of `"7.0"` stays `"7.0"` rather than being re-rendered through a
/// numeric type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Move {
    Undock {
        ship: String,
    },
    Thrust {
        ship: String,
        magnitude: String,
        angle: String,
    },
    Dock {
        ship: String,
        planet: String,
    },
}

impl Move {
    /// Builds a move from a recorded order record.
    pub fn from_order(order: &Order) -> Result<Self, ParseError> {
        let ship = order.ship_id.to_string();
        let missing = |field| ParseError::MissingField {
            kind: order.kind.clone(),
            ship_id: order.ship_id,
            field,
        };

        // Orders are dispatched on the first character of the type tag, the
        // same way stream commands are dispatched on their leading letter.
        match order.kind.chars().next() {
            Some('u') => Ok(Move::Undock { ship }),
            Some('t') => {
                let magnitude = order.magnitude.ok_or_else(|| missing("magnitude"))?;
                let angle = order.angle.ok_or_else(|| missing("angle"))?;
                Ok(Move::Thrust {
                    ship,
                    magnitude: magnitude.to_string(),
                    angle: normalize_angle(angle).to_string(),
                })
            }
            Some('d') => {
                let planet = order.planet_id.ok_or_else(|| missing("planet_id"))?;
                Ok(Move::Dock {
                    ship,
                    planet: planet.to_string(),
                })
            }
            _ => Err(ParseError::UnknownCommand(order.kind.clone())),
        }
    }

    /// Renders the canonical wire text for this move.
    pub fn canonical(&self) -> String {
        match self {
            Move::Undock { ship } => format!("u {ship}"),
            Move::Thrust {
                ship,
                magnitude,
                angle,
            } => format!("t {ship} {magnitude} {angle}"),
            Move::Dock { ship, planet } => format!("d {ship} {planet}"),
        }
    }

    /// The raw ship-id token.
    pub fn ship_token(&self) -> &str {
        match self {
            Move::Undock { ship }
            | Move::Thrust { ship, .. }
            | Move::Dock { ship, .. } => ship,
        }
    }

    /// The ship id as an integer, for keying a [`MoveMap`].
    pub fn ship_id(&self) -> Result<i64, ParseError> {
        let token = self.ship_token();
        token.parse().map_err(|_| ParseError::InvalidNumber {
            field: "ship id",
            value: token.to_string(),
        })
    }
}

/// A per-turn mapping from ship id to the canonical text of its command.
///
/// Used purely for equality comparison; the text is never decoded again.
/// Iteration is in ascending ship-id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveMap {
    commands: BTreeMap<i64, String>,
}

impl MoveMap {
    /// Parses one line of whitespace-delimited move commands (a bot's raw
    /// reply).
    ///
    /// Arity is keyed by the leading letter of each command token: `u` takes
    /// one field, `d` two, `t` three. A thrust angle whose textual form does
    /// not begin with `-` is replaced by its integer value modulo 360; every
    /// other token is kept verbatim in the canonical text.
    pub fn parse_stream(line: &str) -> Result<Self, ParseError> {
        let mut map = MoveMap::default();
        let mut tokens = line.split_whitespace();

        while let Some(head) = tokens.next() {
            let mv = match head.chars().next() {
                Some('u') => Move::Undock {
                    ship: take_field(&mut tokens, head)?,
                },
                Some('d') => Move::Dock {
                    ship: take_field(&mut tokens, head)?,
                    planet: take_field(&mut tokens, head)?,
                },
                Some('t') => {
                    let ship = take_field(&mut tokens, head)?;
                    let magnitude = take_field(&mut tokens, head)?;
                    let angle = normalize_angle_token(&take_field(&mut tokens, head)?)?;
                    Move::Thrust {
                        ship,
                        magnitude,
                        angle,
                    }
                }
                _ => return Err(ParseError::UnknownCommand(head.to_string())),
            };
            map.insert(mv)?;
        }

        Ok(map)
    }

    /// Builds a map from recorded order records (the replay baseline).
    pub fn from_orders<'a, I>(orders: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = &'a Order>,
    {
        let mut map = MoveMap::default();
        for order in orders {
            map.insert(Move::from_order(order)?)?;
        }
        Ok(map)
    }

    fn insert(&mut self, mv: Move) -> Result<(), ParseError> {
        let ship_id = mv.ship_id()?;
        self.commands.insert(ship_id, mv.canonical());
        Ok(())
    }

    /// The canonical command text for a ship, if it issued one this turn.
    pub fn command(&self, ship_id: i64) -> Option<&str> {
        self.commands.get(&ship_id).map(String::as_str)
    }

    /// Ship ids present in this map, ascending.
    pub fn ship_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.commands.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Mod-360 reduction applied only to strictly positive angles; zero and
/// negative values pass through. Matches the recording format exactly.
fn normalize_angle(angle: i64) -> i64 {
    if angle > 0 { angle % 360 } else { angle }
}

/// Stream-mode variant of the angle rule: the textual sign decides whether
/// the token is re-rendered as `int(token) % 360` or kept verbatim.
fn normalize_angle_token(token: &str) -> Result<String, ParseError> {
    if token.starts_with('-') {
        return Ok(token.to_string());
    }
    let value: i64 = token.parse().map_err(|_| ParseError::InvalidNumber {
        field: "angle",
        value: token.to_string(),
    })?;
    Ok((value % 360).to_string())
}

fn take_field<'a, I>(tokens: &mut I, command: &str) -> Result<String, ParseError>
where
    I: Iterator<Item = &'a str>,
{
    tokens.next().map(str::to_owned).ok_or_else(|| ParseError::Incomplete {
        command: command.to_string(),
    })
}
