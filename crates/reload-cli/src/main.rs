//! Binary entry point for the reload harness.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use reload_core::RunConfig;

/// Replays a recorded match against live bots and reports every ship whose
/// move diverges from the recording.
#[derive(Parser, Debug)]
#[command(name = "reload", version, about)]
struct Cli {
    /// Decompressed-JSON replay file
    replay: PathBuf,

    /// Player id whose recorded moves form the baseline
    player_id: i64,

    /// Bot command (split on whitespace into program + arguments)
    bot_command: String,

    /// Optional second bot command to compare side by side
    second_bot_command: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the report on stdout.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut bot_commands = vec![cli.bot_command];
    if let Some(second) = cli.second_bot_command {
        bot_commands.push(second);
    }

    let config = RunConfig {
        replay_path: cli.replay,
        player_id: cli.player_id,
        bot_commands,
    };

    let mut stdout = std::io::stdout();
    reload_cli::runner::run(&config, &mut stdout).await
}
