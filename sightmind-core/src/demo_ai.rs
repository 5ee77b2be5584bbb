//! An alpha-beta demonstrator for [`ConnectFour`], kept only for comparison.
//!
//! Depth-limited alpha-beta with a line-counting heuristic. Nothing in
//! `sightmind-mcts`/`sightmind-engine` calls into this module; it exists to
//! show the core search/inference machinery doesn't depend on it, and to
//! give the CLI an `--opponent alphabeta` mode to play against.

use crate::connect_four::ConnectFour;
use crate::state::{GameState, Player};

/// Depth-limited alpha-beta player for [`ConnectFour`].
pub struct AlphaBetaAi {
    pub depth: u32,
}

impl AlphaBetaAi {
    pub fn new(depth: u32) -> Self {
        assert!(depth >= 1);
        Self { depth }
    }

    /// Best move for the side to move, or `None` on a terminal state.
    pub fn best_move(&self, state: &ConnectFour) -> Option<u8> {
        if !state.has_moves() {
            return None;
        }
        let maximizing_player = state.player_to_move();
        let (mv, _score) = self.search(state, self.depth, f64::NEG_INFINITY, f64::INFINITY, maximizing_player);
        mv
    }

    fn search(
        &self,
        state: &ConnectFour,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
        maximizing_player: Player,
    ) -> (Option<u8>, f64) {
        if !state.has_moves() {
            let terminal_score = if depth == self.depth {
                0.0
            } else {
                score_terminal(state, maximizing_player, self.depth - depth)
            };
            return (None, terminal_score);
        }
        if depth == 0 {
            return (None, heuristic_score(state, maximizing_player));
        }

        let maximizing = state.player_to_move() == maximizing_player;
        let mut best_move = None;
        let mut best_score = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for mv in state.legal_moves() {
            let mut child = state.clone();
            child.apply(mv);
            let (_, score) = self.search(&child, depth - 1, alpha, beta, maximizing_player);

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                alpha = alpha.max(best_score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                beta = beta.min(best_score);
            }
            if beta <= alpha {
                break;
            }
        }

        (best_move, best_score)
    }
}

/// Favor faster wins and slower losses: an anti-stalling adjustment that
/// subtracts a depth-scaled penalty from terminal scores.
fn score_terminal(state: &ConnectFour, for_player: Player, plies_from_root: u32) -> f64 {
    let result = state.result(for_player);
    if result == 1.0 {
        1.0 + 1.0 / (1.0 + plies_from_root as f64)
    } else if result == 0.0 {
        -1.0 - 1.0 / (1.0 + plies_from_root as f64)
    } else {
        0.0
    }
}

/// Line-counting board score: count open 4-windows by how many of
/// `for_player`'s pieces they already contain, weighted more heavily for
/// denser windows.
fn heuristic_score(state: &ConnectFour, for_player: Player) -> f64 {
    let opponent = for_player.opponent();
    let rows = state.rows();
    let cols = state.cols();
    let mut score = 0.0;

    let mut windows: Vec<[(usize, usize); 4]> = Vec::new();
    for row in 0..rows {
        for col in 0..cols.saturating_sub(3) {
            windows.push([(row, col), (row, col + 1), (row, col + 2), (row, col + 3)]);
        }
    }
    for col in 0..cols {
        for row in 0..rows.saturating_sub(3) {
            windows.push([(row, col), (row + 1, col), (row + 2, col), (row + 3, col)]);
        }
    }
    for row in 0..rows.saturating_sub(3) {
        for col in 0..cols.saturating_sub(3) {
            windows.push([
                (row, col),
                (row + 1, col + 1),
                (row + 2, col + 2),
                (row + 3, col + 3),
            ]);
            windows.push([
                (row + 3, col),
                (row + 2, col + 1),
                (row + 1, col + 2),
                (row, col + 3),
            ]);
        }
    }

    for window in windows {
        let mut mine = 0;
        let mut theirs = 0;
        for (r, c) in window {
            match state.cell_owner(r, c) {
                Some(p) if p == for_player => mine += 1,
                Some(p) if p == opponent => theirs += 1,
                _ => {}
            }
        }
        if mine > 0 && theirs > 0 {
            continue; // blocked window, worthless to either side
        }
        if mine > 0 {
            score += window_weight(mine);
        } else if theirs > 0 {
            score -= window_weight(theirs);
        }
    }

    score
}

fn window_weight(count: usize) -> f64 {
    match count {
        1 => 1.0,
        2 => 2.0,
        3 => 5.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_an_immediate_win() {
        let mut state = ConnectFour::default();
        // X stacks three in column 0 (rows 5,4,3); O stacks in column 1 in between.
        state.apply(0); // X r5c0
        state.apply(1); // O r5c1
        state.apply(0); // X r4c0
        state.apply(1); // O r4c1
        state.apply(0); // X r3c0
        state.apply(1); // O r3c1
        // X to move again: dropping on column 0 completes a vertical four.
        let ai = AlphaBetaAi::new(3);
        let mv = ai.best_move(&state);
        assert_eq!(mv, Some(0));
    }

    #[test]
    fn blocks_an_immediate_opponent_win() {
        let mut state = ConnectFour::default();
        // O builds three in a row on the bottom row at cols 1,2,3; X must block at 0 or 4.
        state.apply(5); // X
        state.apply(1); // O
        state.apply(6); // X
        state.apply(2); // O
        state.apply(5); // X
        state.apply(3); // O -- O now has 1,2,3 on bottom row, threatening 0 and 4
        let ai = AlphaBetaAi::new(4);
        let mv = ai.best_move(&state).unwrap();
        assert!(mv == 0 || mv == 4);
    }

    #[test]
    fn returns_none_on_terminal_state() {
        let mut state = ConnectFour::default();
        for _ in 0..3 {
            state.apply(3);
            state.apply(4);
        }
        state.apply(3);
        assert!(!state.has_moves());
        let ai = AlphaBetaAi::new(2);
        assert_eq!(ai.best_move(&state), None);
    }
}
