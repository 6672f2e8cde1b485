//! The record that travels on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};
use velha_engine::{Board, Mark};

// ---------------------------------------------------------------------------
// MatchStatus
// ---------------------------------------------------------------------------

/// What the addressee of a record should do next, or how their match ended.
///
/// The wire tokens are lowercase Portuguese words; decoding accepts any
/// case. The serde names match the wire tokens so a record logged as JSON
/// reads the same as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Not your turn (or still waiting for an opponent).
    #[serde(rename = "aguarde")]
    Waiting,
    /// Send a move.
    #[serde(rename = "jogue")]
    YourTurn,
    /// You completed a line.
    #[serde(rename = "ganhou")]
    Won,
    /// Your opponent completed a line.
    #[serde(rename = "perdeu")]
    Lost,
    /// Board full, no line.
    #[serde(rename = "empate")]
    Draw,
    /// Your opponent disconnected ("walkover").
    #[serde(rename = "wo")]
    OpponentLeft,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 6] = [
        MatchStatus::Waiting,
        MatchStatus::YourTurn,
        MatchStatus::Won,
        MatchStatus::Lost,
        MatchStatus::Draw,
        MatchStatus::OpponentLeft,
    ];

    /// The lowercase wire token.
    pub fn token(self) -> &'static str {
        match self {
            MatchStatus::Waiting => "aguarde",
            MatchStatus::YourTurn => "jogue",
            MatchStatus::Won => "ganhou",
            MatchStatus::Lost => "perdeu",
            MatchStatus::Draw => "empate",
            MatchStatus::OpponentLeft => "wo",
        }
    }

    /// Parses a wire token, ignoring case.
    pub fn from_token(token: &str) -> Option<MatchStatus> {
        Self::ALL
            .into_iter()
            .find(|status| status.token().eq_ignore_ascii_case(token))
    }

    /// `true` when the match is over for the addressee: after this record
    /// the server closes the connection.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MatchStatus::Won | MatchStatus::Lost | MatchStatus::Draw | MatchStatus::OpponentLeft
        )
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// ---------------------------------------------------------------------------
// MatchState
// ---------------------------------------------------------------------------

/// One message, in either direction.
///
/// Server → player: `id` is the addressee's mark, `position` is `None`,
/// and `board` is the live board after the last accepted move.
///
/// Player → server: `id` is the sender's own mark, `status` is normally
/// [`MatchStatus::YourTurn`], and `position` is the chosen cell. The server
/// ignores the `board` a player sends back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub id: Mark,
    pub status: MatchStatus,
    pub position: Option<usize>,
    pub board: Board,
}

impl MatchState {
    /// A record without a move, as the server sends them.
    pub fn new(id: Mark, status: MatchStatus, board: Board) -> Self {
        Self {
            id,
            status,
            position: None,
            board,
        }
    }

    /// The same record carrying a move.
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}
