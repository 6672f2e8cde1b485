//! The 3×3 board and its pure queries.
//!
//! Cells are addressed by index, row-major:
//!
//! ```text
//!  0 | 1 | 2
//! ---+---+---
//!  3 | 4 | 5
//! ---+---+---
//!  6 | 7 | 8
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Every line that wins the game, in the fixed order all scans use.
///
/// Rows first, then columns, then the two diagonals. `winner()` and
/// `winning_triple()` report the first match in this order, so results
/// are reproducible for boards with more than one complete line.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

// ---------------------------------------------------------------------------
// Mark
// ---------------------------------------------------------------------------

/// A player symbol.
///
/// Only two values exist, and the board never has to reject a third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Both marks, X first.
    pub const ALL: [Mark; 2] = [Mark::X, Mark::O];

    /// The other player's mark.
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// The uppercase letter used on the wire and in logs.
    pub fn as_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }

    /// Parses a mark, ignoring case. Anything else is `None`.
    pub fn from_str_ignore_case(s: &str) -> Option<Mark> {
        if s.eq_ignore_ascii_case("x") {
            Some(Mark::X)
        } else if s.eq_ignore_ascii_case("o") {
            Some(Mark::O)
        } else {
            None
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// The content of one board cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Cell {
    #[default]
    Empty,
    X,
    O,
}

impl Cell {
    /// `X ↔ O`; `Empty` stays `Empty`.
    pub fn opponent(self) -> Cell {
        match self {
            Cell::X => Cell::O,
            Cell::O => Cell::X,
            Cell::Empty => Cell::Empty,
        }
    }

    /// The mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
            Cell::Empty => None,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

impl From<Option<Mark>> for Cell {
    fn from(mark: Option<Mark>) -> Self {
        mark.map_or(Cell::Empty, Cell::from)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mark() {
            Some(mark) => write!(f, "{mark}"),
            None => write!(f, "."),
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Nine cells, indexed 0–8 row-major.
///
/// `Board` is `Copy` (it's 9 bytes), so handing a snapshot to the move
/// selector or a wire record never shares state with the live game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct Board {
    cells: [Cell; 9],
}

impl Board {
    /// Number of cells on the board.
    pub const SIZE: usize = 9;

    /// Corner cells, in scan order.
    pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

    /// Edge (side-middle) cells, in scan order.
    pub const EDGES: [usize; 4] = [1, 3, 5, 7];

    /// The center cell.
    pub const CENTER: usize = 4;

    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from nine cells.
    pub fn from_cells(cells: [Cell; 9]) -> Self {
        Self { cells }
    }

    /// All nine cells, in index order.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// The cell at `pos`, or `None` when `pos` is out of range.
    pub fn get(&self, pos: usize) -> Option<Cell> {
        self.cells.get(pos).copied()
    }

    /// The cell at `pos`.
    ///
    /// # Panics
    /// Panics if `pos > 8`. Use [`get`](Self::get) for untrusted indices.
    pub fn cell(&self, pos: usize) -> Cell {
        self.cells[pos]
    }

    /// Writes `mark` into `pos`.
    ///
    /// Does not check whether the cell was empty; callers that need that
    /// guarantee go through [`Rules::play`](crate::Rules::play).
    ///
    /// # Errors
    /// [`EngineError::OutOfRange`] if `pos > 8`; the board is unchanged.
    pub fn set_cell(&mut self, pos: usize, mark: Mark) -> Result<(), EngineError> {
        let slot = self
            .cells
            .get_mut(pos)
            .ok_or(EngineError::OutOfRange(pos))?;
        *slot = Cell::from(mark);
        Ok(())
    }

    /// `true` if `pos` is in range and holds no mark.
    pub fn is_vacant(&self, pos: usize) -> bool {
        self.get(pos) == Some(Cell::Empty)
    }

    /// Resets every cell to `Empty`.
    pub fn clear(&mut self) {
        self.cells = [Cell::Empty; 9];
    }

    /// `true` when no cell holds a mark.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    /// `true` when every cell holds a mark.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Indices of the empty cells, ascending.
    pub fn vacant_cells(&self) -> Vec<usize> {
        (0..Self::SIZE).filter(|&pos| self.is_vacant(pos)).collect()
    }

    /// How many cells hold `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        let cell = Cell::from(mark);
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// The first complete non-empty line in [`LINES`] order.
    pub fn winning_triple(&self) -> Option<[usize; 3]> {
        LINES.iter().copied().find(|&[a, b, c]| {
            let first = self.cells[a];
            !first.is_empty() && first == self.cells[b] && first == self.cells[c]
        })
    }

    /// The cell occupying the winning triple, or `Empty` if nobody has won.
    pub fn winner(&self) -> Cell {
        self.winning_triple()
            .map_or(Cell::Empty, |[a, _, _]| self.cells[a])
    }

    /// Full board and no winner.
    pub fn is_draw(&self) -> bool {
        self.is_full() && self.winner() == Cell::Empty
    }

    /// Full board or somebody has a line.
    pub fn is_game_over(&self) -> bool {
        self.is_full() || self.winner() != Cell::Empty
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                write!(f, "/")?;
            }
            for cell in chunk {
                write!(f, "{cell}")?;
            }
        }
        Ok(())
    }
}

/// Shorthand for building boards in tests: `'X'`, `'O'`, anything else empty.
#[cfg(test)]
pub(crate) fn board_from(layout: &str) -> Board {
    let mut cells = [Cell::Empty; 9];
    for (slot, ch) in cells.iter_mut().zip(layout.chars().filter(|c| !c.is_whitespace())) {
        *slot = match ch {
            'X' => Cell::X,
            'O' => Cell::O,
            _ => Cell::Empty,
        };
    }
    Board::from_cells(cells)
}
