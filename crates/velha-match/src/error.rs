//! Error types for the match layer.

use velha_transport::ConnectionId;

/// Errors that can occur during match operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// Two players are already seated; the connection was closed.
    #[error("match is full, refused {0}")]
    MatchFull(ConnectionId),

    /// The match actor's command channel is full or closed.
    #[error("match is unavailable")]
    Unavailable,
}
