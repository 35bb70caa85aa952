//! One live bot subprocess and its per-turn conversation.
//!
//! The protocol is strictly synchronous: every send is followed by a blocking
//! read of exactly one reply line before anything else happens. A bot that
//! hangs hangs the run; a bot that dies or emits an unparsable line kills the
//! run. There is no retry, timeout, or partial-result recovery — the harness
//! exists to debug bots, and a hard early failure is the useful behavior.

use std::process::Stdio;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use reload_proto::{MoveMap, ParseError};

/// Failures on a bot session. All of them are fatal to the run.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("bot command is empty")]
    EmptyCommand,

    #[error("failed to spawn bot `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("bot process has no {0} pipe")]
    MissingPipe(&'static str),

    #[error("i/o error on bot pipe: {0}")]
    Io(#[from] std::io::Error),

    #[error("bot closed its pipe while a reply was pending")]
    PipeClosed,

    #[error("bot reply did not parse as move commands: {0}")]
    Reply(#[from] ParseError),
}

/// A spawned bot subprocess with its pipes and per-turn move history.
#[derive(Debug)]
pub struct BotSession {
    command: String,
    child: Child,
    stdin: ChildStdin,
    replies: Lines<BufReader<ChildStdout>>,
    history: Vec<MoveMap>,
}

impl BotSession {
    /// Spawns a bot subprocess with piped stdin/stdout.
    ///
    /// The command is split on whitespace into program + arguments. Stderr is
    /// inherited so bot diagnostics stay visible on the console. The child is
    /// spawned kill-on-drop: whatever path the run exits by, the process is
    /// killed and reaped and its pipes closed.
    pub fn spawn(command: &str) -> Result<Self, SessionError> {
        let mut parts = command.split_whitespace();
        let program = parts.next().ok_or(SessionError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SessionError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or(SessionError::MissingPipe("stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or(SessionError::MissingPipe("stdout"))?;

        debug!(command, pid = child.id(), "spawned bot");

        Ok(Self {
            command: command.to_string(),
            child,
            stdin,
            replies: BufReader::new(stdout).lines(),
            history: Vec::new(),
        })
    }

    /// Runs the startup handshake: player id, board dimensions, then the
    /// turn-0 frame.
    ///
    /// The bot's single reply line is read and discarded — it may be an
    /// opening acknowledgement or an eager turn-0 move, and neither matters
    /// here.
    pub async fn handshake(
        &mut self,
        player_id: i64,
        dimensions: &str,
        opening_frame: &str,
    ) -> Result<(), SessionError> {
        self.send_line(&player_id.to_string()).await?;
        self.send_line(dimensions).await?;
        self.send_line(opening_frame).await?;

        let greeting = self.read_line().await?;
        debug!(command = %self.command, greeting = %greeting, "bot handshake complete");
        Ok(())
    }

    /// One steady-state round trip: send the frame, block for exactly one
    /// reply line, canonicalize it, and append it to this session's history.
    pub async fn exchange(&mut self, frame: &str) -> Result<(), SessionError> {
        self.send_line(frame).await?;
        let reply = self.read_line().await?;
        let moves = MoveMap::parse_stream(&reply)?;
        self.history.push(moves);
        Ok(())
    }

    /// Canonical move maps collected so far, one per completed turn.
    pub fn history(&self) -> &[MoveMap] {
        &self.history
    }

    /// The command this session was spawned from.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Process id of the child, while it is still running.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    async fn send_line(&mut self, line: &str) -> Result<(), SessionError> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, SessionError> {
        self.replies
            .next_line()
            .await?
            .ok_or(SessionError::PipeClosed)
    }
}
