//! The differential turn loop.
//!
//! Sequencing per turn: encode the frame once, round-trip it through every
//! session in registration order, derive the baseline from the recording,
//! then diff and report. Nothing is pipelined — per-turn state is identical
//! and deterministic across sessions (game history, not bot choices, drives
//! the next frame), so overlapping them would only buy reordered console
//! output.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::{debug, info};

use reload_adapters::BotSession;
use reload_core::{Replay, RunConfig, diff_turn, encode_frame};
use reload_proto::MoveMap;

/// Drives a full differential replay, writing report blocks and the final
/// `Completed OK` line to `out`.
///
/// Any fatal condition — unreadable replay, spawn failure, broken pipe,
/// unparsable reply — aborts the loop immediately with no partial report
/// beyond what was already written. Sessions are killed and reaped on every
/// exit path.
pub async fn run<W: Write>(config: &RunConfig, out: &mut W) -> Result<()> {
    config.validate()?;

    let replay = Replay::from_file(&config.replay_path).context("failed to load replay")?;
    info!(
        turns = replay.turn_count(),
        bots = config.bot_commands.len(),
        "starting differential replay"
    );

    let mut sessions = Vec::with_capacity(config.bot_commands.len());
    for command in &config.bot_commands {
        sessions.push(BotSession::spawn(command)?);
    }

    let dimensions = format!("{} {}", replay.width, replay.height);
    let opening = encode_frame(&replay, 0)?;
    for session in &mut sessions {
        session
            .handshake(config.player_id, &dimensions, &opening)
            .await
            .with_context(|| format!("handshake with `{}` failed", session.command()))?;
    }

    for turn in 0..replay.turn_count() {
        let frame = encode_frame(&replay, turn)?;

        for session in &mut sessions {
            session
                .exchange(&frame)
                .await
                .with_context(|| format!("turn {turn}: bot `{}` failed", session.command()))?;
        }

        let baseline =
            MoveMap::from_orders(replay.recorded_moves(turn, config.player_id)?.values())?;

        let observed: Vec<&MoveMap> = sessions
            .iter()
            .map(|session| &session.history()[turn])
            .collect();

        if let Some(report) = diff_turn(turn, &baseline, &observed) {
            debug!(turn, divergent_ships = report.rows.len(), "divergence found");
            report.write_to(out)?;
        }
    }

    writeln!(out, "Completed OK")?;
    Ok(())
}
