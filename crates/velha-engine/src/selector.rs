//! Heuristic move selection for automated players.
//!
//! The selector runs a fixed priority pipeline and returns the first step
//! that produces a cell:
//!
//! ```text
//! 1. attack            win now if a line is one mark short
//! 2. defense        *  block the opponent's winning cell
//! 3. opening corner    empty board, coin flip: start in a corner
//! 4. attack triangle   set up a double threat around an enemy center
//! 5. defense triangle * answer a known fork pattern
//! 6. center            take cell 4
//! 7. corner            best free corner
//! 8. edge              best free edge
//!
//! * gated: taken with probability difficulty / 10
//! ```
//!
//! Steps 7 and 8 (and the opening corner) pick among several cells with
//! the tie-break rule in [`choose_best`]. Every random decision draws from
//! the caller's [`RandomSource`], so a scripted source reproduces a game
//! exactly.

use serde::{Deserialize, Serialize};

use crate::{Board, Cell, EngineError, LINES, Mark, RandomSource};

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// How often the selector plays the gated defensive steps, 0–10.
///
/// At level `n` each gate opens with probability `n / 10`: level 10 always
/// defends, level 0 never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    /// Never defends.
    pub const MIN: Difficulty = Difficulty(0);
    /// Always defends.
    pub const MAX: Difficulty = Difficulty(10);

    /// # Errors
    /// [`EngineError::InvalidDifficulty`] when `level > 10`.
    pub fn new(level: u8) -> Result<Self, EngineError> {
        if level > Self::MAX.0 {
            return Err(EngineError::InvalidDifficulty(level));
        }
        Ok(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// One gate draw: a uniform `r` in `0..10`, open when `r >= 10 - level`.
    fn gate_opens<R: RandomSource + ?Sized>(self, rng: &mut R) -> bool {
        rng.below(10) >= usize::from(Self::MAX.0 - self.0)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = EngineError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> u8 {
        d.0
    }
}

// ---------------------------------------------------------------------------
// Pattern catalogues
// ---------------------------------------------------------------------------

/// What a matched fork pattern answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Response {
    /// A fixed cell.
    Cell(usize),
    /// Any free edge, via the tie-break rule.
    Edge,
}

/// A defense-triangle pattern: the selector holds the center, the opponent
/// holds exactly `opponent`, and every other cell is empty.
#[derive(Debug, Clone, Copy)]
struct ForkPattern {
    opponent: [usize; 2],
    response: Response,
}

impl ForkPattern {
    fn matches(&self, board: &Board, player: Mark) -> bool {
        (0..Board::SIZE).all(|pos| {
            let expected = if pos == Board::CENTER {
                Cell::from(player)
            } else if self.opponent.contains(&pos) {
                Cell::from(player.opponent())
            } else {
                Cell::Empty
            };
            board.cell(pos) == expected
        })
    }
}

/// Fork answers, matched in order.
///
/// Opposite-corner forks are met on an edge. The "two edges" and
/// "corner + far edge" forks each have a fixed reply. The catalogue does
/// not hold every rotation of the corner + far edge shape (opponent on 0
/// and 7, for instance, is absent); those positions fall through to the
/// later steps.
const FORK_CATALOGUE: [ForkPattern; 10] = [
    ForkPattern { opponent: [0, 8], response: Response::Edge },
    ForkPattern { opponent: [2, 6], response: Response::Edge },
    ForkPattern { opponent: [1, 5], response: Response::Cell(2) },
    ForkPattern { opponent: [5, 7], response: Response::Cell(8) },
    ForkPattern { opponent: [3, 7], response: Response::Cell(6) },
    ForkPattern { opponent: [1, 3], response: Response::Cell(0) },
    ForkPattern { opponent: [0, 5], response: Response::Cell(2) },
    ForkPattern { opponent: [2, 7], response: Response::Cell(8) },
    ForkPattern { opponent: [3, 8], response: Response::Cell(6) },
    ForkPattern { opponent: [1, 6], response: Response::Cell(0) },
];

/// An attack-triangle pattern: the opponent holds the center, the selector
/// holds only `corner`, everything else is empty. Playing `target` (the
/// opposite corner) threatens two lines at once.
#[derive(Debug, Clone, Copy)]
struct TrianglePattern {
    corner: usize,
    target: usize,
}

impl TrianglePattern {
    fn matches(&self, board: &Board, player: Mark) -> bool {
        (0..Board::SIZE).all(|pos| {
            let expected = if pos == Board::CENTER {
                Cell::from(player.opponent())
            } else if pos == self.corner {
                Cell::from(player)
            } else {
                Cell::Empty
            };
            board.cell(pos) == expected
        })
    }
}

const TRIANGLE_CATALOGUE: [TrianglePattern; 4] = [
    TrianglePattern { corner: 0, target: 8 },
    TrianglePattern { corner: 2, target: 6 },
    TrianglePattern { corner: 6, target: 2 },
    TrianglePattern { corner: 8, target: 0 },
];

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Which pipeline step produced the move. Only used for tracing.
#[derive(Debug, Clone, Copy)]
enum Step {
    Attack,
    Defense,
    OpeningCorner,
    AttackTriangle,
    DefenseTriangle,
    Center,
    Corner,
    Edge,
}

/// Picks a cell for `player` on `board`.
///
/// Returns `None` only when the board has no empty cell. The returned cell
/// is always empty.
///
/// ```rust
/// use velha_engine::{select_move, Board, Difficulty, Mark, ScriptedRandom};
///
/// let mut board = Board::new();
/// board.set_cell(0, Mark::X).unwrap();
/// board.set_cell(4, Mark::X).unwrap();
/// board.set_cell(1, Mark::O).unwrap();
///
/// let mut rng = ScriptedRandom::default();
/// assert_eq!(select_move(&board, Mark::X, Difficulty::MAX, &mut rng), Some(8));
/// ```
pub fn select_move<R: RandomSource + ?Sized>(
    board: &Board,
    player: Mark,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<usize> {
    let picked = run_pipeline(board, player, difficulty, rng);
    match picked {
        Some((step, pos)) => {
            tracing::trace!(%player, %board, ?step, pos, "move selected");
            Some(pos)
        }
        None => {
            tracing::trace!(%player, %board, "no move available");
            None
        }
    }
}

fn run_pipeline<R: RandomSource + ?Sized>(
    board: &Board,
    player: Mark,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<(Step, usize)> {
    if let Some(pos) = winning_cell(board, player) {
        return Some((Step::Attack, pos));
    }

    if difficulty.gate_opens(rng) {
        if let Some(pos) = winning_cell(board, player.opponent()) {
            return Some((Step::Defense, pos));
        }
    }

    // The coin is only flipped on an empty board.
    if board.is_empty() && rng.coin() {
        if let Some(pos) = choose_best(board, player, &free(board, &Board::CORNERS), rng) {
            return Some((Step::OpeningCorner, pos));
        }
    }

    if let Some(pos) = attack_triangle(board, player) {
        return Some((Step::AttackTriangle, pos));
    }

    if difficulty.gate_opens(rng) {
        if let Some(pos) = defense_triangle(board, player, rng) {
            return Some((Step::DefenseTriangle, pos));
        }
    }

    if board.is_vacant(Board::CENTER) {
        return Some((Step::Center, Board::CENTER));
    }

    if let Some(pos) = choose_best(board, player, &free(board, &Board::CORNERS), rng) {
        return Some((Step::Corner, pos));
    }

    choose_best(board, player, &free(board, &Board::EDGES), rng)
        .map(|pos| (Step::Edge, pos))
}

/// The first empty cell (ascending) that completes a line of `player`.
fn winning_cell(board: &Board, player: Mark) -> Option<usize> {
    let mark = Cell::from(player);
    line_matches(board, &board.vacant_cells(), [Cell::Empty, mark, mark])
        .first()
        .copied()
}

fn attack_triangle(board: &Board, player: Mark) -> Option<usize> {
    TRIANGLE_CATALOGUE
        .iter()
        .find(|pattern| pattern.matches(board, player))
        .map(|pattern| pattern.target)
}

fn defense_triangle<R: RandomSource + ?Sized>(
    board: &Board,
    player: Mark,
    rng: &mut R,
) -> Option<usize> {
    let pattern = FORK_CATALOGUE
        .iter()
        .find(|pattern| pattern.matches(board, player))?;
    match pattern.response {
        Response::Cell(pos) => Some(pos),
        Response::Edge => choose_best(board, player, &free(board, &Board::EDGES), rng),
    }
}

/// The subset of `cells` that is empty, keeping order.
fn free(board: &Board, cells: &[usize]) -> Vec<usize> {
    cells.iter().copied().filter(|&pos| board.is_vacant(pos)).collect()
}

// ---------------------------------------------------------------------------
// Tie-break
// ---------------------------------------------------------------------------

/// Chooses among `candidates` (all empty cells).
///
/// 1. A single candidate is returned without drawing.
/// 2. Prefer candidates that build towards a line: on some line the
///    two other cells are one `player` mark and one empty cell.
/// 3. Otherwise prefer candidates that sit on a completely empty line.
/// 4. Otherwise any candidate.
///
/// Steps 2 and 3 collect one entry per qualifying line, so a cell that
/// qualifies on several lines is proportionally more likely to be drawn.
fn choose_best<R: RandomSource + ?Sized>(
    board: &Board,
    player: Mark,
    candidates: &[usize],
    rng: &mut R,
) -> Option<usize> {
    match candidates {
        [] => return None,
        [only] => return Some(*only),
        _ => {}
    }

    let mark = Cell::from(player);
    let mut building = line_matches(board, candidates, [Cell::Empty, Cell::Empty, mark]);
    building.extend(line_matches(board, candidates, [Cell::Empty, mark, Cell::Empty]));
    if !building.is_empty() {
        return Some(building[rng.below(building.len())]);
    }

    let fresh = line_matches(board, candidates, [Cell::Empty; 3]);
    if !fresh.is_empty() {
        return Some(fresh[rng.below(fresh.len())]);
    }

    Some(candidates[rng.below(candidates.len())])
}

/// Every `(candidate, line)` pair where reading the line cyclically from the
/// candidate gives `pattern`. The candidate is pushed once per such pair.
fn line_matches(board: &Board, candidates: &[usize], pattern: [Cell; 3]) -> Vec<usize> {
    let mut found = Vec::new();
    for &pos in candidates {
        for line in &LINES {
            for (i, &cell) in line.iter().enumerate() {
                if cell != pos {
                    continue;
                }
                let next = line[(i + 1) % 3];
                let after = line[(i + 2) % 3];
                if board.cell(cell) == pattern[0]
                    && board.cell(next) == pattern[1]
                    && board.cell(after) == pattern[2]
                {
                    found.push(pos);
                }
            }
        }
    }
    found
}
