//! sightmind CLI - demonstrates the adaptive, opponent-modeling engine on
//! Connect Four.
//!
//! Commands:
//! - play: play a single game, printing the board and the belief as it updates
//! - match: play a batch of games in parallel and report aggregate win rates
//! - sight: print the sight array for a position reached by a move sequence

mod match_cmd;
mod match_play;
mod metrics;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sightmind")]
#[command(about = "Adaptive, opponent-modeling MCTS engine, demonstrated on Connect Four")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Seed the RNG for reproducible runs (single-threaded only).
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game and print it move by move.
    Play(match_cmd::PlayArgs),
    /// Play a batch of games in parallel and report win rates.
    Match(match_play::MatchArgs),
    /// Print the sight array for a position.
    Sight(match_cmd::SightArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => match_cmd::run_play(args, cli.seed),
        Commands::Match(args) => match_play::run(args, cli.seed),
        Commands::Sight(args) => match_cmd::run_sight(args),
    }
}
