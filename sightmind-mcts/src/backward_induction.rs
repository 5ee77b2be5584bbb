//! Backward-induction evaluator: minimax over an MCTS-built statistical
//! tree, and the sight-array producer built on top of it.
//!
//! Leaf values are the empirical win rate `wins/visits`, never Laplace-
//! smoothed; unlike the move-vote in `search.rs`, which does smooth.

use sightmind_core::GameState;

use crate::search::{build_tree_single, ComputeOptions, ComputeOptionsError, TreePolicy};
use crate::tree::{MctsTree, NodeId};

/// Tie tolerance for comparing `score_from_below` values: two scores are
/// considered equal iff `round(1e5 * a) == round(1e5 * b)`.
fn scaled(x: f64) -> i64 {
    (x * 100_000.0).round() as i64
}

/// Plain backward induction: leaf values are the subtree's true leaves, or
/// wherever the recursion hits depth `0` or a node with no children
/// (untried moves don't interrupt it - this variant trusts MCTS's visit
/// counts at any depth).
pub fn backward_induction<S: GameState>(tree: &mut MctsTree<S>, node: NodeId, depth: u32) -> f64 {
    backward_induction_level(tree, node, depth, 0, false)
}

/// Adapt variant: additionally stops as soon as any child of the current
/// node still has untried moves, since "statistical estimates are only
/// trusted where the subtree was fully expanded."
pub fn backward_induction_adapt<S: GameState>(
    tree: &mut MctsTree<S>,
    node: NodeId,
    depth: u32,
) -> f64 {
    backward_induction_level(tree, node, depth, 0, true)
}

fn backward_induction_level<S: GameState>(
    tree: &mut MctsTree<S>,
    node: NodeId,
    depth: u32,
    level: u32,
    adapt: bool,
) -> f64 {
    let children: Vec<NodeId> = tree.get(node).children.clone();
    let has_children = !children.is_empty();

    let interrupt = adapt
        && has_children
        && children.iter().any(|&c| tree.get(c).has_untried_moves());

    if depth == 0 || !has_children || interrupt {
        let win_rate = tree.get(node).win_rate();
        let n = tree.get_mut(node);
        n.score_from_below = Some(win_rate);
        n.bi_depth = Some(level);
        return win_rate;
    }

    let mut best = f64::NEG_INFINITY;
    for child in children {
        let value = backward_induction_level(tree, child, depth - 1, level + 1, adapt);
        best = best.max(value);
    }

    let score = 1.0 - best;
    tree.get_mut(node).score_from_below = Some(score);
    score
}

/// Among `node`'s children, pick the one whose `score_from_below` equals
/// `1 - node.score_from_below` (within 1e-5), tie-breaking toward the
/// shallower `bi_depth` (the faster forced outcome). Requires
/// `score_from_below`/`bi_depth` to already be populated by a prior
/// `backward_induction*` call on `node`.
fn tiebreak_move<S: GameState>(tree: &MctsTree<S>, node: NodeId) -> S::Move {
    let root = tree.get(node);
    if !root.has_children() {
        return S::NO_MOVE;
    }
    let target = scaled(1.0 - root.score_from_below.expect("backward induction not run"));

    let mut best: Option<NodeId> = None;
    for &child_id in &root.children {
        let child = tree.get(child_id);
        if scaled(child.score_from_below.expect("backward induction not run")) != target {
            continue;
        }
        best = match best {
            None => Some(child_id),
            Some(current) => {
                if child.bi_depth.unwrap() < tree.get(current).bi_depth.unwrap() {
                    Some(child_id)
                } else {
                    Some(current)
                }
            }
        };
    }
    best.map(|id| tree.get(id).mv).unwrap_or(S::NO_MOVE)
}

/// Build a uniform-policy tree and, for every `k` in `1..=k_max`, return the
/// move that realizes the minimax value at backward-induction depth `k`.
/// The uniform policy (as opposed to UCT) yields opponent-neutral subtree
/// statistics, which is what makes this array a model of "what a depth-k
/// opponent would play here" rather than a model of the engine's own play.
pub fn sight_array<S: GameState + Send>(
    root_state: &S,
    k_max: u32,
    options: &ComputeOptions,
) -> Result<Vec<S::Move>, ComputeOptionsError> {
    options.validate()?;

    // A terminal root has no legal moves to rank; every entry is the
    // sentinel.
    if !root_state.has_moves() {
        return Ok(vec![S::NO_MOVE; k_max as usize]);
    }

    let mut job_options = options.clone();
    job_options.verbose = false;

    let mut tree = build_tree_single(root_state, TreePolicy::Uniform, &job_options, 1943);
    let root = tree.root();

    let mut array = Vec::with_capacity(k_max as usize);
    for k in 1..=k_max {
        backward_induction(&mut tree, root, k);
        array.push(tiebreak_move(&tree, root));
    }
    Ok(array)
}
