//! Adaptive move selector: the one crate a driver needs to play a
//! full game - wraps the MCTS kernel (`sightmind-mcts`) and the belief
//! update (`sightmind-infer`) behind three move-selection entry points.
//!
//! Reads like a table of contents:
//! 1. Ask whether the opponent's sight level is inferred with confidence.
//! 2. If not, fall back to a plain move.
//! 3. If so, run the adaptive (opponent-aware) search instead.

use tracing::info;

use sightmind_core::GameState;
pub use sightmind_infer::{is_inferrable, Belief, LinkMatrix, DEFAULT_TAU};
pub use sightmind_mcts::{sight_array, ComputeOptions, ComputeOptionsError};

/// Plain UCT move, no opponent modeling.
pub fn compute_move<S: GameState + Send>(
    state: &S,
    options: &ComputeOptions,
) -> Result<S::Move, ComputeOptionsError> {
    sightmind_mcts::compute_move(state, options)
}

/// Depth-capped UCT move.
pub fn compute_move_capped<S: GameState + Send>(
    state: &S,
    max_level: u32,
    options: &ComputeOptions,
) -> Result<S::Move, ComputeOptionsError> {
    assert!(max_level >= 1, "max_level must be at least 1");
    sightmind_mcts::compute_move_capped(state, max_level, options)
}

/// Opponent-aware move: checks whether `belief` is concentrated enough to
/// act on, and either runs the adaptive search pruned to the inferred sight
/// level or falls back to [`compute_move`].
pub fn compute_adaptive_move<S: GameState + Send>(
    state: &S,
    max_sight: u32,
    belief: &Belief,
    options: &ComputeOptions,
) -> Result<S::Move, ComputeOptionsError> {
    let (inferrable, k_star) = is_inferrable(belief, DEFAULT_TAU);
    if !inferrable {
        info!("opponent sight not yet inferrable, falling back to plain UCT");
        return compute_move(state, options);
    }

    let sight_inferred = (k_star + 1) as u32;
    info!(sight_inferred, "opponent sight inferred, running adaptive search");
    sightmind_mcts::compute_adaptive_move(state, sight_inferred, max_sight, options)
}

/// Recompute the belief after observing the opponent's move, given the
/// sight array that was already computed for the position before they
/// moved.
pub fn update_prior<M: PartialEq>(
    observed_move: &M,
    sight_array: &[M],
    prior: &[f64],
    link_matrix: &LinkMatrix,
) -> Vec<f64> {
    sightmind_infer::posterior(prior, observed_move, sight_array, link_matrix)
}
