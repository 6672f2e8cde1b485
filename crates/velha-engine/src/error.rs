//! Error types for the engine.

/// Errors raised by board and rules operations.
///
/// None of these are fatal: they describe a move or setting the caller
/// should not have asked for, and the board is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The cell index is outside `0..=8`.
    #[error("cell {0} is out of range (expected 0-8)")]
    OutOfRange(usize),

    /// The target cell already holds a mark.
    #[error("cell {0} is already occupied")]
    Occupied(usize),

    /// The difficulty level is outside `0..=10`.
    #[error("difficulty {0} is out of range (expected 0-10)")]
    InvalidDifficulty(u8),
}
