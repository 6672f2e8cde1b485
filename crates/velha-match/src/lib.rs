//! Match lifecycle management for Velha.
//!
//! One [`Match`] pairs two connections, assigns marks, enforces turns, and
//! applies moves through the rules engine. It runs inside a single Tokio
//! task (the match actor), so connect, move and disconnect events are
//! handled one at a time in arrival order.
//!
//! # Key types
//!
//! - [`Match`]: the state machine, driven by `on_connect`, `on_message`
//!   and `on_disconnect`
//! - [`Outbox`]: where the match writes replies and close requests
//! - [`MatchHandle`]: send commands to a running match actor
//! - [`MatchPhase`]: `Empty`, `Seeking`, `Playing`

mod actor;
mod error;
mod outbox;
mod phase;
mod session;

pub use actor::{MatchHandle, MatchSnapshot, Outbound, OutboundSender, spawn_match};
pub use error::MatchError;
pub use outbox::{Outbox, OutboxEvent, RecordingOutbox};
pub use phase::MatchPhase;
pub use session::{Match, PlayerSlot};

/// Default command channel size for match actors.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;
