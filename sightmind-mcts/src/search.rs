//! MCTS search kernel: one shared iteration skeleton, four tree policies.
//!
//! ## Architecture
//! - Level 2: [`compute_move`]/[`compute_move_capped`] - root-parallel drivers
//! - Level 3: [`build_tree_single`] - one worker's full build loop
//! - Level 4: selection/expansion/simulation/backprop phases

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::debug;

use sightmind_core::GameState;

use crate::backward_induction::sight_array;
use crate::tree::{MctsTree, NodeId};

const UCT_C: f64 = std::f64::consts::SQRT_2;

/// Misconfigured [`ComputeOptions`]; a caller mistake, not a fatal
/// contract violation, so it's a `Result` rather than a panic.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeOptionsError {
    #[error("ComputeOptions needs max_iterations >= 0 or max_time_s >= 0.0, got neither")]
    NoBudget,
    #[error("number_of_threads must be at least 1, got {0}")]
    NoThreads(u32),
}

/// Search budget and parallelism.
#[derive(Clone, Debug)]
pub struct ComputeOptions {
    pub number_of_threads: u32,
    /// Negative means "no iteration budget" (time budget governs instead).
    pub max_iterations: i64,
    /// Negative means "no time budget" (iteration budget governs instead).
    pub max_time_s: f64,
    pub verbose: bool,
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            number_of_threads: 1,
            max_iterations: 10_000,
            max_time_s: -1.0,
            verbose: false,
        }
    }
}

impl ComputeOptions {
    pub fn validate(&self) -> Result<(), ComputeOptionsError> {
        if self.number_of_threads == 0 {
            return Err(ComputeOptionsError::NoThreads(self.number_of_threads));
        }
        if self.max_iterations < 0 && self.max_time_s < 0.0 {
            return Err(ComputeOptionsError::NoBudget);
        }
        Ok(())
    }
}

/// The four tree policies the search kernel can build a tree under.
#[derive(Clone, Copy, Debug)]
pub enum TreePolicy {
    /// Standard UCT selection.
    Uct,
    /// Uniform-random child selection; used to build opponent-neutral trees
    /// for backward induction (`sight_array`).
    Uniform,
    /// UCT selection, but never descends past `max_level` plies from root.
    Capped { max_level: u32 },
    /// UCT selection, plus mid-search opponent-move inference and pruning
    /// at depth 1 from the root.
    Adaptive { sight_inferred: u32, max_sight: u32 },
}

/// Build one full tree under `policy` until the iteration/time budget in
/// `options` is exhausted. `seed` lets callers (root-parallel workers, tests)
/// get independent or reproducible trees.
pub fn build_tree_single<S: GameState + Send>(
    root_state: &S,
    policy: TreePolicy,
    options: &ComputeOptions,
    seed: u64,
) -> MctsTree<S> {
    assert!(
        root_state.has_moves(),
        "build_tree_single invoked on a terminal state"
    );

    let mut tree = MctsTree::new(root_state);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let start = Instant::now();

    let mut iterations: i64 = 0;
    loop {
        if options.max_iterations >= 0 && iterations >= options.max_iterations {
            break;
        }
        if options.max_time_s >= 0.0 && start.elapsed().as_secs_f64() >= options.max_time_s {
            break;
        }

        run_single_iteration(&mut tree, root_state, policy, options, &mut rng);
        iterations += 1;

        if options.verbose && iterations % 1000 == 0 {
            debug!(iterations, nodes = tree.len(), "search progress");
        }
    }

    tree
}

fn run_single_iteration<S: GameState + Send>(
    tree: &mut MctsTree<S>,
    root_state: &S,
    policy: TreePolicy,
    options: &ComputeOptions,
    rng: &mut ChaCha8Rng,
) {
    let (leaf, mut state) = match policy {
        TreePolicy::Adaptive {
            sight_inferred,
            max_sight,
        } => select_adaptive(tree, root_state, sight_inferred, max_sight, options, rng),
        _ => select(tree, root_state, policy),
    };

    let leaf = if state.has_moves() && tree.get(leaf).has_untried_moves() {
        expand(tree, leaf, &mut state, rng)
    } else {
        leaf
    };

    let winner_for = simulate(&mut state, rng);
    tree.backprop(leaf, winner_for);
}

/// Standard (non-adaptive) selection: walk down picking children per
/// `policy` while the current node is fully expanded and has children, and
/// (for `Capped`) while still within `max_level`.
fn select<S: GameState>(tree: &MctsTree<S>, root_state: &S, policy: TreePolicy) -> (NodeId, S) {
    let mut node = tree.root();
    let mut state = root_state.clone();
    let mut depth = 0u32;

    loop {
        let capped_out = matches!(policy, TreePolicy::Capped { max_level } if depth >= max_level);
        if capped_out || tree.get(node).has_untried_moves() || !tree.get(node).has_children() {
            break;
        }
        node = select_uct_child(tree, node);
        state.apply(tree.get(node).mv);
        depth += 1;
    }
    (node, state)
}

/// Adaptive selection: identical to [`select`] under UCT, except that at
/// depth 1 from the root it consults (and lazily computes) the parent's
/// inferred opponent move, pruning and restarting the whole selection from
/// the root if the UCT-picked child doesn't match.
fn select_adaptive<S: GameState + Send>(
    tree: &mut MctsTree<S>,
    root_state: &S,
    sight_inferred: u32,
    max_sight: u32,
    options: &ComputeOptions,
    rng: &mut ChaCha8Rng,
) -> (NodeId, S) {
    loop {
        let mut node = tree.root();
        let mut state = root_state.clone();
        let mut level = 0u32;
        let mut restarted = false;

        while tree.get(node).has_children() && !tree.get(node).has_untried_moves() {
            let parent = node;
            let child = select_uct_child(tree, parent);

            if level == 1 {
                if tree.get(parent).move_inferred.is_none() {
                    let array = sight_array(&state, max_sight, options)
                        .expect("ComputeOptions already validated by the caller");
                    let inferred = array[(sight_inferred.max(1) - 1) as usize];
                    tree.get_mut(parent).move_inferred = Some(inferred);
                }
                let inferred = tree.get(parent).move_inferred.unwrap();
                if tree.get(child).mv != inferred {
                    tree.prune_child(parent, tree.get(child).mv);
                    restarted = true;
                    break;
                }
            }

            node = child;
            state.apply(tree.get(node).mv);
            level += 1;
        }

        if !restarted {
            return (node, state);
        }
    }
}

fn select_uct_child<S: GameState>(tree: &MctsTree<S>, node: NodeId) -> NodeId {
    let parent = tree.get(node);
    let parent_visits = parent.visits.max(1) as f64;

    parent
        .children
        .iter()
        .copied()
        .max_by(|&a, &b| {
            uct_value(tree.get(a), parent_visits)
                .partial_cmp(&uct_value(tree.get(b), parent_visits))
                .unwrap()
        })
        .expect("select_uct_child: node has no children")
}

fn uct_value<S: GameState>(node: &crate::tree::MctsNode<S>, parent_visits: f64) -> f64 {
    if node.visits == 0 {
        return f64::INFINITY;
    }
    let exploitation = node.win_rate();
    let exploration = UCT_C * (parent_visits.ln() / node.visits as f64).sqrt();
    exploitation + exploration
}

fn expand<S: GameState>(
    tree: &mut MctsTree<S>,
    node: NodeId,
    state: &mut S,
    rng: &mut ChaCha8Rng,
) -> NodeId {
    let untried = &tree.get(node).untried_moves;
    let mv = untried[rng.gen_range(0..untried.len())];
    state.apply(mv);
    tree.expand(node, mv, state)
}

/// Random playout from `state` to a terminal position; returns a closure
/// mapping a player to their result there (`1.0`/`0.5`/`0.0`).
fn simulate<S: GameState>(state: &mut S, rng: &mut ChaCha8Rng) -> impl Fn(sightmind_core::Player) -> f64 + '_ {
    while state.has_moves() {
        state.apply_random(rng);
    }
    move |player| state.result(player)
}

/// Root-parallel search: build `options.number_of_threads` independent
/// trees and merge their root-child statistics with a Laplace-smoothed vote.
fn compute_roots<S: GameState + Send>(
    root_state: &S,
    policy: TreePolicy,
    options: &ComputeOptions,
) -> Vec<MctsTree<S>> {
    let threads = options.number_of_threads.max(1) as usize;
    if threads == 1 {
        return vec![build_tree_single(root_state, policy, options, worker_seed(0))];
    }

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let seed = worker_seed(t as u64);
                scope.spawn(move || build_tree_single(root_state, policy, options, seed))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

/// Deterministic per-worker seed offset combined with a true-random
/// component, so workers don't collide with each other but also don't
/// reuse the same sequence across process runs.
fn worker_seed(t: u64) -> u64 {
    let entropy: u64 = rand::thread_rng().gen();
    (1_012_411u64.wrapping_mul(t).wrapping_add(12_515)) ^ entropy
}

/// Merge root-child statistics across `roots`, returning the move with the
/// highest Laplace-smoothed win rate `(w+1)/(v+2)`. Linear scan (not a map)
/// since `S::Move` isn't required to be `Hash`/`Ord`.
fn vote<S: GameState>(roots: &[MctsTree<S>]) -> S::Move {
    let mut stats: Vec<(S::Move, u32, f64)> = Vec::new();
    for tree in roots {
        for &child_id in &tree.get(tree.root()).children {
            let child = tree.get(child_id);
            match stats.iter_mut().find(|(mv, _, _)| *mv == child.mv) {
                Some(entry) => {
                    entry.1 += child.visits;
                    entry.2 += child.wins;
                }
                None => stats.push((child.mv, child.visits, child.wins)),
            }
        }
    }

    let mut best_move = S::NO_MOVE;
    let mut best_score = f64::NEG_INFINITY;
    for (mv, visits, wins) in stats {
        let score = (wins + 1.0) / (visits as f64 + 2.0);
        if score > best_score {
            best_score = score;
            best_move = mv;
        }
    }
    best_move
}

/// If the root has exactly one legal move, return it directly without
/// launching any search worker.
fn single_choice<S: GameState>(root_state: &S) -> Option<S::Move> {
    let mut moves = root_state.legal_moves().into_iter();
    let only = moves.next()?;
    if moves.next().is_none() {
        Some(only)
    } else {
        None
    }
}

/// Top-level UCT move computation.
pub fn compute_move<S: GameState + Send>(
    root_state: &S,
    options: &ComputeOptions,
) -> Result<S::Move, ComputeOptionsError> {
    options.validate()?;
    if let Some(mv) = single_choice(root_state) {
        return Ok(mv);
    }
    let roots = compute_roots(root_state, TreePolicy::Uct, options);
    Ok(vote(&roots))
}

/// Top-level depth-capped move computation.
pub fn compute_move_capped<S: GameState + Send>(
    root_state: &S,
    max_level: u32,
    options: &ComputeOptions,
) -> Result<S::Move, ComputeOptionsError> {
    options.validate()?;
    if let Some(mv) = single_choice(root_state) {
        return Ok(mv);
    }
    let roots = compute_roots(root_state, TreePolicy::Capped { max_level }, options);
    Ok(vote(&roots))
}

/// Top-level adaptive move computation. Unconditional: callers decide
/// whether the opponent is inferrable first (via
/// `sightmind-infer::is_inferrable`) and fall back to [`compute_move`] if
/// not; that decision lives in `sightmind-engine`, not here.
pub fn compute_adaptive_move<S: GameState + Send>(
    root_state: &S,
    sight_inferred: u32,
    max_sight: u32,
    options: &ComputeOptions,
) -> Result<S::Move, ComputeOptionsError> {
    options.validate()?;
    if let Some(mv) = single_choice(root_state) {
        return Ok(mv);
    }
    let policy = TreePolicy::Adaptive {
        sight_inferred,
        max_sight,
    };
    let roots = compute_roots(root_state, policy, options);
    Ok(vote(&roots))
}
