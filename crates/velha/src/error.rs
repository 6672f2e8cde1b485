//! Unified error type for the Velha workspace.

use velha_engine::{Board, EngineError};
use velha_match::MatchError;
use velha_protocol::ProtocolError;
use velha_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each wrapped variant generates a `From`
/// impl, so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum VelhaError {
    /// A transport-level error (bind, connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A record could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rules or settings error (bad cell, bad difficulty).
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The match refused a player or is gone.
    #[error(transparent)]
    Match(#[from] MatchError),

    /// The server closed the stream before sending a final status.
    #[error("server closed the connection before the match ended")]
    UnexpectedEof,

    /// The server asked for a move on a board with no empty cell.
    #[error("asked to move on a full board {0}")]
    NoLegalMove(Board),
}
