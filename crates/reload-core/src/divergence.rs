//! Per-turn comparison of canonicalized move maps.
//!
//! The baseline (the recording) is compared against every live session over
//! the union of ship ids seen this turn. Comparison is pure text equality on
//! canonical command strings; a ship missing from a party's map compares as
//! `(blank)` rather than erroring.

use std::collections::BTreeSet;
use std::io::{self, Write};

use reload_proto::MoveMap;

/// Report column width. Commands are left-justified into columns of this
/// many characters so baseline and session texts line up visually.
pub const COLUMN_WIDTH: usize = 18;

/// Placeholder for a ship with no command in a given map.
pub const BLANK: &str = "(blank)";

/// One divergent ship within a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivergenceRow {
    pub ship_id: i64,
    pub baseline: String,
    pub observed: Vec<String>,
}

/// All divergences found in one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub turn: usize,
    pub rows: Vec<DivergenceRow>,
}

/// Compares every session's move map against the baseline for one turn.
///
/// Returns `None` when no ship diverges.
pub fn diff_turn(turn: usize, baseline: &MoveMap, sessions: &[&MoveMap]) -> Option<TurnReport> {
    let mut ship_ids: BTreeSet<i64> = baseline.ship_ids().collect();
    for session in sessions {
        ship_ids.extend(session.ship_ids());
    }

    let mut rows = Vec::new();
    for ship_id in ship_ids {
        let expected = baseline.command(ship_id).unwrap_or(BLANK);
        let observed: Vec<&str> = sessions
            .iter()
            .map(|session| session.command(ship_id).unwrap_or(BLANK))
            .collect();

        if observed.iter().any(|&text| text != expected) {
            rows.push(DivergenceRow {
                ship_id,
                baseline: expected.to_string(),
                observed: observed.into_iter().map(str::to_owned).collect(),
            });
        }
    }

    if rows.is_empty() {
        None
    } else {
        Some(TurnReport { turn, rows })
    }
}

impl TurnReport {
    /// Writes the report block: a turn header, then one indented line per
    /// divergent ship with the baseline and each session's command in fixed
    /// columns, no separator between them.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Turn {}", self.turn)?;
        for row in &self.rows {
            write!(out, "    ")?;
            write!(out, "{:<width$}", row.baseline, width = COLUMN_WIDTH)?;
            for text in &row.observed {
                write!(out, "{:<width$}", text, width = COLUMN_WIDTH)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
