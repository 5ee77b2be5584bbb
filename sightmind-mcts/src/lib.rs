//! Adaptive, opponent-modeling Monte Carlo Tree Search.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: [`compute_move`]/[`compute_move_capped`]/[`compute_adaptive_move`] (orchestration)
//! - Level 2: [`search`] - tree policies, root-parallel build, vote merge
//! - Level 3: [`backward_induction`] - minimax evaluator, sight array
//! - Level 4: [`tree`] - arena node accessors

pub mod backward_induction;
pub mod search;
pub mod tree;

pub use backward_induction::{backward_induction, backward_induction_adapt, sight_array};
pub use search::{
    compute_adaptive_move, compute_move, compute_move_capped, ComputeOptions, ComputeOptionsError,
    TreePolicy,
};
pub use tree::{MctsNode, MctsTree, NodeId};
