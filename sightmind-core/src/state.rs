//! The game-state contract the search/inference core is generic over.

use rand::Rng;

/// Which side is to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

/// The small interface the MCTS/inference core consumes from an embedding
/// game. A `State` is cheaply copyable: the search kernel clones the root
/// state once per iteration and replays moves into the clone rather than
/// mutating shared state.
///
/// `result` is only ever called on a terminal state (`has_moves() == false`);
/// implementations should `debug_assert!` this precondition rather than
/// return a sentinel value.
pub trait GameState: Clone {
    /// A legal move. `NO_MOVE` is a sentinel never produced by `legal_moves`.
    type Move: Copy + Eq + std::fmt::Debug;

    const NO_MOVE: Self::Move;

    fn player_to_move(&self) -> Player;

    /// Legal moves at this state. Empty iff the state is terminal.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Equivalent to `!legal_moves().is_empty()`, but implementations may
    /// compute it more cheaply (e.g. from a cached winner check).
    fn has_moves(&self) -> bool;

    /// Apply `mv`, which must be a member of `legal_moves()`.
    fn apply(&mut self, mv: Self::Move);

    /// Uniform-random move, applied in place. Equivalent to sampling
    /// `legal_moves()` uniformly and calling `apply`.
    fn apply_random<R: Rng + ?Sized>(&mut self, rng: &mut R);

    /// Result for `for_player` on a terminal state: 0.0 (loss), 0.5 (draw),
    /// or 1.0 (win). Precondition: `!self.has_moves()`.
    fn result(&self, for_player: Player) -> f64;
}
