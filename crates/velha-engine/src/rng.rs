//! Random-source abstraction.
//!
//! Several decisions are random: which mark a new player gets, who moves
//! first, whether the selector's defensive steps fire, and how ties between
//! equally good cells are broken. All of them draw through [`RandomSource`]
//! so that tests can swap in [`ScriptedRandom`] and assert exact outputs.

use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::StdRng;

/// A source of uniform random draws.
pub trait RandomSource {
    /// A uniform integer in `0..n`. Returns 0 when `n == 0`.
    fn below(&mut self, n: usize) -> usize;

    /// A fair coin. `true` with probability one half.
    fn coin(&mut self) -> bool {
        self.below(2) == 1
    }
}

impl RandomSource for StdRng {
    fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.random_range(0..n)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn below(&mut self, n: usize) -> usize {
        (**self).below(n)
    }

    fn coin(&mut self) -> bool {
        (**self).coin()
    }
}

// ---------------------------------------------------------------------------
// ScriptedRandom
// ---------------------------------------------------------------------------

/// Replays a fixed list of draws.
///
/// Each call to [`below(n)`](RandomSource::below) pops the next scripted
/// value and reduces it modulo `n`; once the script runs out every draw is
/// 0. `coin()` is `below(2) == 1`, so script a `1` for heads.
///
/// ```rust
/// use velha_engine::{RandomSource, ScriptedRandom};
///
/// let mut rng = ScriptedRandom::new([7, 1, 12]);
/// assert_eq!(rng.below(10), 7);
/// assert!(rng.coin());
/// assert_eq!(rng.below(10), 2);
/// assert_eq!(rng.below(10), 0); // exhausted
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<usize>,
    consumed: usize,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = usize>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            consumed: 0,
        }
    }

    /// How many draws have been taken so far (including past the script).
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, n: usize) -> usize {
        self.consumed += 1;
        let draw = self.draws.pop_front().unwrap_or(0);
        if n == 0 { 0 } else { draw % n }
    }
}
