//! Game engine for Velha (tic-tac-toe).
//!
//! Everything in this crate is pure: no I/O, no async, no shared state.
//!
//! - **Board** ([`Board`], [`Cell`], [`Mark`]): the 3×3 grid and its
//!   queries (full, winner, winning triple).
//! - **Rules** ([`Rules`], [`Outcome`]): applies validated moves to a board
//!   and reports how the game stands afterwards.
//! - **Selector** ([`select_move`], [`Difficulty`]): the heuristic move
//!   picker used by automated players.
//! - **Randomness** ([`RandomSource`], [`ScriptedRandom`]): every random
//!   decision in the workspace goes through this trait so tests can replay
//!   exact draws.
//!
//! # How it fits in the stack
//!
//! ```text
//! Match layer   ← drives Rules on every accepted move
//!     ↕
//! Protocol      ← carries a Board inside every wire record
//!     ↕
//! Engine (this crate)
//! ```

mod board;
mod error;
mod rng;
mod rules;
mod selector;

pub use board::{Board, Cell, LINES, Mark};
pub use error::EngineError;
pub use rng::{RandomSource, ScriptedRandom};
pub use rules::{Outcome, Rules};
pub use selector::{Difficulty, select_move};
