//! The statistical search tree: arena-backed, addressed by [`NodeId`].
//!
//! A flat `Vec<MctsNode>` rather than heap-allocated linked nodes, generic
//! over any [`GameState`] and extended with the evaluator scratch fields
//! (`score_from_below`, `bi_depth`, `move_inferred`) the backward induction
//! and adaptive-selection passes need.
//!
//! There is no virtual-loss bookkeeping: the concurrency model here is root
//! parallelization with fully independent per-worker trees, so there is
//! never more than one in-flight selection path per tree.

use sightmind_core::GameState;

/// Index into the tree's node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// A node in the search tree.
pub struct MctsNode<S: GameState> {
    /// The move that produced this node. Sentinel (`S::NO_MOVE`) at the root.
    pub mv: S::Move,
    pub parent: Option<NodeId>,
    pub player_to_move: sightmind_core::Player,
    pub wins: f64,
    pub visits: u32,
    pub untried_moves: Vec<S::Move>,
    pub children: Vec<NodeId>,

    /// Evaluator scratch: minimax value of this subtree, `[0, 1]`,
    /// "probability current player wins from here".
    pub score_from_below: Option<f64>,
    /// Depth at which `score_from_below` was realized; tie-breaks toward
    /// the shallower forced line.
    pub bi_depth: Option<u32>,
    /// For the adaptive policy: the move the opponent is predicted to play
    /// from this node. Set once and never recomputed.
    pub move_inferred: Option<S::Move>,
}

impl<S: GameState> MctsNode<S> {
    fn new(mv: S::Move, parent: Option<NodeId>, state: &S) -> Self {
        Self {
            mv,
            parent,
            player_to_move: state.player_to_move(),
            wins: 0.0,
            visits: 0,
            untried_moves: state.legal_moves(),
            children: Vec::new(),
            score_from_below: None,
            bi_depth: None,
            move_inferred: None,
        }
    }

    pub fn has_untried_moves(&self) -> bool {
        !self.untried_moves.is_empty()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn update(&mut self, result: f64) {
        self.visits += 1;
        self.wins += result;
    }

    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / self.visits as f64
        }
    }
}

/// Arena-backed search tree. Dead slots from [`MctsTree::prune_child`] are
/// never compacted (deletion is O(pruned-subtree-size) in "mark unreachable",
/// not "reclaim memory" - see DESIGN.md).
pub struct MctsTree<S: GameState> {
    nodes: Vec<MctsNode<S>>,
}

impl<S: GameState> MctsTree<S> {
    pub fn new(root_state: &S) -> Self {
        let root = MctsNode::new(S::NO_MOVE, None, root_state);
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> &MctsNode<S> {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode<S> {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Move one untried move out of `parent` and add a fresh child for it.
    /// `child_state` must be the result of applying `mv` to `parent`'s state.
    pub fn expand(&mut self, parent: NodeId, mv: S::Move, child_state: &S) -> NodeId {
        let slot = self.nodes[parent.0]
            .untried_moves
            .iter()
            .position(|&m| m == mv)
            .expect("expand: mv must be untried at parent");
        self.nodes[parent.0].untried_moves.swap_remove(slot);

        let child_id = NodeId(self.nodes.len());
        self.nodes.push(MctsNode::new(mv, Some(parent), child_state));
        self.nodes[parent.0].children.push(child_id);
        child_id
    }

    /// Detach and drop the child of `parent` whose incoming move is `mv`.
    /// Used by the adaptive policy to remove branches inconsistent with the
    /// inferred opponent reply. The detached subtree's arena slots become
    /// unreachable dead weight; they are never reclaimed or reindexed, which
    /// keeps every other live [`NodeId`] valid.
    pub fn prune_child(&mut self, parent: NodeId, mv: S::Move) {
        let slot = self.nodes[parent.0]
            .children
            .iter()
            .position(|&id| self.nodes[id.0].mv == mv);
        if let Some(slot) = slot {
            self.nodes[parent.0].children.remove(slot);
        }
    }

    /// Backpropagate `result` (from the perspective of each ancestor's
    /// `player_to_move`) from `leaf` up to the root.
    pub fn backprop(&mut self, leaf: NodeId, result_for: impl Fn(sightmind_core::Player) -> f64) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = self.get_mut(id);
            let r = result_for(node.player_to_move);
            node.update(r);
            current = node.parent;
        }
    }
}
