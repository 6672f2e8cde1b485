//! The rules engine: one board, validated moves, game result.

use serde::{Deserialize, Serialize};

use crate::{Board, Cell, EngineError, Mark};

/// How the game stands after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Nobody has a line and there are empty cells left.
    InProgress,
    /// The given mark completed a line.
    Won(Mark),
    /// The board is full and nobody has a line.
    Draw,
}

impl Outcome {
    /// `true` for `Won` and `Draw`.
    pub fn is_over(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

/// Owns the board of a single match.
///
/// The rules engine checks that a move lands on a real, empty cell. It
/// does not know whose turn it is; the match layer decides that before
/// calling [`play`](Self::play).
#[derive(Debug, Clone, Default)]
pub struct Rules {
    board: Board,
}

impl Rules {
    /// A fresh engine with an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine starting from an existing position.
    pub fn with_board(board: Board) -> Self {
        Self { board }
    }

    /// The current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Places `mark` at `pos` and reports the resulting outcome.
    ///
    /// # Errors
    /// - [`EngineError::OutOfRange`] if `pos > 8`
    /// - [`EngineError::Occupied`] if the cell already holds a mark
    ///
    /// The board is unchanged on error.
    pub fn play(&mut self, pos: usize, mark: Mark) -> Result<Outcome, EngineError> {
        match self.board.get(pos) {
            None => return Err(EngineError::OutOfRange(pos)),
            Some(Cell::Empty) => {}
            Some(_) => return Err(EngineError::Occupied(pos)),
        }
        self.board.set_cell(pos, mark)?;
        let outcome = self.outcome();
        tracing::trace!(pos, %mark, board = %self.board, ?outcome, "move applied");
        Ok(outcome)
    }

    /// The outcome of the current position.
    pub fn outcome(&self) -> Outcome {
        match self.board.winner().mark() {
            Some(mark) => Outcome::Won(mark),
            None if self.board.is_full() => Outcome::Draw,
            None => Outcome::InProgress,
        }
    }

    pub fn winner(&self) -> Cell {
        self.board.winner()
    }

    pub fn is_draw(&self) -> bool {
        self.board.is_draw()
    }

    pub fn is_game_over(&self) -> bool {
        self.board.is_game_over()
    }

    /// Clears the board for a new match.
    pub fn reset(&mut self) {
        self.board.clear();
    }
}
