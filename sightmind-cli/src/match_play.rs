//! Match command - a parallel batch of games, reporting aggregate win rates.
//!
//! A plain-data result struct combinable across batches, fed by a
//! `rayon`-parallel driver over independent games: the engine always plays
//! as [`Player::One`](sightmind_core::Player::One) against a fixed-sight
//! capped-MCTS opponent.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games_parallel() - rayon fan-out, MatchSummary::combine fold
//! - Level 3: play_one_game() (in match_cmd) - one game
//! - Level 4: reporting utilities

use anyhow::Result;
use clap::Args;
use rayon::prelude::*;

use sightmind_core::Player;

use crate::match_cmd::{play_one_game, Opponent, Outcome, PlayArgs};
use crate::metrics::GameLog;

const DEFAULT_K: u32 = 5;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Number of games to play.
    #[arg(long, default_value = "20")]
    pub games: usize,

    /// Which player sits opposite the adaptive engine.
    #[arg(long, value_enum, default_value = "capped-mcts")]
    pub opponent: Opponent,

    /// Reasoning depth the opponent is simulated at (a capped-MCTS player).
    #[arg(long, default_value = "3")]
    pub opponent_sight: u32,

    /// Number of sight levels the engine tracks belief over.
    #[arg(long, default_value_t = DEFAULT_K)]
    pub k: u32,

    /// Iterations per move for both the engine and the simulated opponent.
    #[arg(long, default_value = "800")]
    pub max_iterations: i64,

    /// Maximum rounds (one move per side each) before declaring a draw.
    #[arg(long, default_value = "42")]
    pub max_rounds: u32,

    /// Output the summary as JSON instead of a text table.
    #[arg(long)]
    pub json: bool,
}

/// Aggregate outcome of a batch of games, from the engine's perspective.
/// Combinable so per-worker partial results can be folded together.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct MatchSummary {
    pub engine_wins: u32,
    pub opponent_wins: u32,
    pub draws: u32,
    pub incomplete: u32,
    pub games_played: u32,
}

impl MatchSummary {
    fn record(&mut self, outcome: Outcome) {
        self.games_played += 1;
        match outcome {
            Outcome::Win(Player::One) => self.engine_wins += 1,
            Outcome::Win(Player::Two) => self.opponent_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Incomplete => self.incomplete += 1,
        }
    }

    fn combine(mut self, other: MatchSummary) -> MatchSummary {
        self.engine_wins += other.engine_wins;
        self.opponent_wins += other.opponent_wins;
        self.draws += other.draws;
        self.incomplete += other.incomplete;
        self.games_played += other.games_played;
        self
    }

    pub fn engine_win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.engine_wins as f64 / self.games_played as f64
        }
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let _ = seed; // per-game randomness comes from the search kernel's own worker seeding
    let summary = play_games_parallel(&args);
    report(&summary, &args);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PARALLEL BATCH
// ============================================================================

/// Play `args.games` independent games across a rayon thread pool and fold
/// their outcomes into one summary.
fn play_games_parallel(args: &MatchArgs) -> MatchSummary {
    let play_args = PlayArgs {
        opponent: args.opponent,
        opponent_sight: args.opponent_sight,
        k: args.k,
        max_iterations: args.max_iterations,
        max_rounds: args.max_rounds,
        log_dir: None,
    };

    (0..args.games)
        .into_par_iter()
        .map(|_| {
            let mut log = GameLog::new(0);
            play_one_game(&play_args, &mut log, false)
        })
        .fold(MatchSummary::default, |mut summary, outcome| {
            summary.record(outcome);
            summary
        })
        .reduce(MatchSummary::default, MatchSummary::combine)
}

// ============================================================================
// LEVEL 4 - REPORTING
// ============================================================================

fn report(summary: &MatchSummary, args: &MatchArgs) {
    if args.json {
        if let Ok(json) = serde_json::to_string_pretty(summary) {
            println!("{json}");
        }
        return;
    }

    println!("=== sightmind match: {} games ===", summary.games_played);
    println!(
        "engine wins: {} ({:.1}%)",
        summary.engine_wins,
        summary.engine_win_rate() * 100.0
    );
    println!(
        "opponent ({:?}, sight {}) wins: {}",
        args.opponent, args.opponent_sight, summary.opponent_wins
    );
    println!("draws: {}", summary.draws);
    if summary.incomplete > 0 {
        println!("incomplete (hit max_rounds): {}", summary.incomplete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_games_parallel_reports_every_game() {
        let args = MatchArgs {
            games: 4,
            opponent: Opponent::CappedMcts,
            opponent_sight: 1,
            k: 3,
            max_iterations: 80,
            max_rounds: 42,
            json: false,
        };
        let summary = play_games_parallel(&args);
        assert_eq!(summary.games_played, 4);
        assert_eq!(
            summary.engine_wins + summary.opponent_wins + summary.draws + summary.incomplete,
            4
        );
    }

    #[test]
    fn match_summary_combine_sums_fields() {
        let mut a = MatchSummary::default();
        a.record(Outcome::Win(Player::One));
        let mut b = MatchSummary::default();
        b.record(Outcome::Draw);

        let combined = a.combine(b);
        assert_eq!(combined.games_played, 2);
        assert_eq!(combined.engine_wins, 1);
        assert_eq!(combined.draws, 1);
    }
}
