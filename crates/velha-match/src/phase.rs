//! The match lifecycle, derived from how many slots are taken.

use serde::{Deserialize, Serialize};

/// Where a match stands.
///
/// ```text
/// Empty ──connect──▶ Seeking ──connect──▶ Playing
///   ▲                   │                   │
///   └───disconnect──────┘                   │
///   └───disconnect / game over──────────────┘
/// ```
///
/// The phase is never stored; it is always computed from the slot count,
/// so it cannot drift out of sync with the slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// No player connected.
    Empty,
    /// One player connected, waiting for an opponent.
    Seeking,
    /// Two players connected; moves are accepted.
    Playing,
}

impl MatchPhase {
    /// The phase for a given number of occupied slots.
    pub fn from_slot_count(slots: usize) -> Self {
        match slots {
            0 => Self::Empty,
            1 => Self::Seeking,
            _ => Self::Playing,
        }
    }

    /// Returns `true` if another player may still join.
    pub fn is_joinable(self) -> bool {
        !matches!(self, Self::Playing)
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Seeking => write!(f, "Seeking"),
            Self::Playing => write!(f, "Playing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_from_slot_count() {
        assert_eq!(MatchPhase::from_slot_count(0), MatchPhase::Empty);
        assert_eq!(MatchPhase::from_slot_count(1), MatchPhase::Seeking);
        assert_eq!(MatchPhase::from_slot_count(2), MatchPhase::Playing);
    }

    #[test]
    fn test_phase_is_joinable() {
        assert!(MatchPhase::Empty.is_joinable());
        assert!(MatchPhase::Seeking.is_joinable());
        assert!(!MatchPhase::Playing.is_joinable());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(MatchPhase::Seeking.to_string(), "Seeking");
    }
}
