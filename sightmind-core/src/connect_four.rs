//! Connect Four: the reference game the engine is demonstrated on.
//!
//! A row-major board, last-move tracking so only the four lines through the
//! last-played cell need checking for a win, and `NO_MOVE = u8::MAX`.

use std::fmt;

use rand::Rng;
use thiserror::Error;

use crate::state::{GameState, Player};

const DEFAULT_ROWS: usize = 6;
const DEFAULT_COLS: usize = 7;

/// Malformed board construction. Connect Four needs at least 4 rows and
/// columns for a four-in-a-row to be possible at all.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must be at least 4x4 to connect four, got {rows}x{cols}")]
    TooSmall { rows: usize, cols: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cell {
    Empty,
    One,
    Two,
}

impl Cell {
    fn belongs_to(self, player: Player) -> bool {
        matches!(
            (self, player),
            (Cell::One, Player::One) | (Cell::Two, Player::Two)
        )
    }
}

/// A Connect Four position. `Move` is the column dropped into.
#[derive(Clone, Debug)]
pub struct ConnectFour {
    rows: usize,
    cols: usize,
    board: Vec<Cell>,
    player_to_move: Player,
    last_move: Option<(usize, usize)>, // (row, col)
}

impl ConnectFour {
    pub fn try_new(rows: usize, cols: usize) -> Result<Self, BoardError> {
        if rows < 4 || cols < 4 {
            return Err(BoardError::TooSmall { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            board: vec![Cell::Empty; rows * cols],
            player_to_move: Player::One,
            last_move: None,
        })
    }

    /// Panics on a malformed board size; use [`ConnectFour::try_new`] to
    /// handle it instead.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::try_new(rows, cols).expect("invalid Connect Four board size")
    }

    fn at(&self, row: usize, col: usize) -> Cell {
        self.board[row * self.cols + col]
    }

    fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.board[row * self.cols + col] = cell;
    }

    /// The piece marker at `(row, col)`, for `Display`/tests.
    pub fn cell_owner(&self, row: usize, col: usize) -> Option<Player> {
        match self.at(row, col) {
            Cell::Empty => None,
            Cell::One => Some(Player::One),
            Cell::Two => Some(Player::Two),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The winner, if the last move completed a four-in-a-row. Only checks
    /// the four lines through `last_move`.
    fn winner(&self) -> Option<Player> {
        let (row, col) = self.last_move?;
        let piece = self.at(row, col);
        let player = match piece {
            Cell::One => Player::One,
            Cell::Two => Player::Two,
            Cell::Empty => return None,
        };

        let directions: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];
        for (dr, dc) in directions {
            let mut count = 1;
            count += self.run_length(row, col, dr, dc, piece);
            count += self.run_length(row, col, -dr, -dc, piece);
            if count >= 4 {
                return Some(player);
            }
        }
        None
    }

    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, piece: Cell) -> usize {
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;
        let mut len = 0;
        while r >= 0 && r < self.rows as isize && c >= 0 && c < self.cols as isize {
            if self.at(r as usize, c as usize) != piece {
                break;
            }
            len += 1;
            r += dr;
            c += dc;
        }
        len
    }
}

impl Default for ConnectFour {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl GameState for ConnectFour {
    type Move = u8;
    const NO_MOVE: u8 = u8::MAX;

    fn player_to_move(&self) -> Player {
        self.player_to_move
    }

    fn legal_moves(&self) -> Vec<u8> {
        if self.winner().is_some() {
            return Vec::new();
        }
        (0..self.cols as u8)
            .filter(|&col| self.at(0, col as usize) == Cell::Empty)
            .collect()
    }

    fn has_moves(&self) -> bool {
        if self.winner().is_some() {
            return false;
        }
        (0..self.cols).any(|col| self.at(0, col) == Cell::Empty)
    }

    fn apply(&mut self, mv: u8) {
        let col = mv as usize;
        debug_assert!(col < self.cols);
        debug_assert!(self.at(0, col) == Cell::Empty);

        let mut row = self.rows - 1;
        while self.at(row, col) != Cell::Empty {
            row -= 1;
        }
        let piece = match self.player_to_move {
            Player::One => Cell::One,
            Player::Two => Cell::Two,
        };
        self.set(row, col, piece);
        self.last_move = Some((row, col));
        self.player_to_move = self.player_to_move.opponent();
    }

    fn apply_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let moves = self.legal_moves();
        debug_assert!(!moves.is_empty());
        let mv = moves[rng.gen_range(0..moves.len())];
        self.apply(mv);
    }

    fn result(&self, for_player: Player) -> f64 {
        debug_assert!(!self.has_moves());
        match self.winner() {
            None => 0.5,
            Some(winner) => {
                if winner == for_player {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for ConnectFour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for col in 0..self.cols {
            write!(f, "{} ", col % 10)?;
        }
        writeln!(f)?;
        for row in 0..self.rows {
            write!(f, "|")?;
            for col in 0..self.cols {
                let marker = match self.at(row, col) {
                    Cell::Empty => '.',
                    Cell::One => 'X',
                    Cell::Two => 'O',
                };
                if col + 1 < self.cols {
                    write!(f, "{} ", marker)?;
                } else {
                    write!(f, "{}", marker)?;
                }
            }
            writeln!(f, "|")?;
        }
        write!(f, "+")?;
        for _ in 0..self.cols {
            write!(f, "--")?;
        }
        writeln!(f, "-+")?;
        match self.player_to_move {
            Player::One => writeln!(f, "X to move"),
            Player::Two => writeln!(f, "O to move"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn initial_state_has_all_columns_open() {
        let state = ConnectFour::default();
        assert_eq!(state.legal_moves().len(), 7);
        assert!(state.has_moves());
        assert_eq!(state.player_to_move(), Player::One);
    }

    #[test]
    fn vertical_four_ends_game() {
        let mut state = ConnectFour::default();
        // X drops on column 3 three times, O elsewhere in between.
        for _ in 0..3 {
            state.apply(3);
            if state.has_moves() {
                state.apply(4);
            }
        }
        assert!(state.has_moves());
        state.apply(3);
        assert!(!state.has_moves());
        assert_eq!(state.result(Player::One), 1.0);
        assert_eq!(state.result(Player::Two), 0.0);
    }

    #[test]
    fn full_board_with_no_winner_is_a_draw() {
        // A 4x4 board filled in a pattern with no four-in-a-row.
        let mut state = ConnectFour::new(4, 4);
        let moves: [u8; 16] = [0, 0, 1, 1, 2, 2, 3, 3, 0, 1, 2, 3, 1, 0, 3, 2];
        for mv in moves {
            if !state.has_moves() {
                break;
            }
            state.apply(mv);
        }
        if !state.has_moves() {
            let r1 = state.result(Player::One);
            assert!(r1 == 0.0 || r1 == 0.5 || r1 == 1.0);
        }
    }

    #[test]
    fn apply_random_always_applies_a_legal_move() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut state = ConnectFour::default();
        while state.has_moves() {
            let legal = state.legal_moves();
            state.apply_random(&mut rng);
            assert!(legal.len() >= 1);
        }
    }

    #[test]
    fn undersized_board_is_rejected() {
        let err = ConnectFour::try_new(4, 3).unwrap_err();
        assert_eq!(err, BoardError::TooSmall { rows: 4, cols: 3 });
    }
}
