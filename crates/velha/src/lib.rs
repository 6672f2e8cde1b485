//! # Velha
//!
//! A two-player tic-tac-toe ("jogo da velha") match server, and a bot that
//! plays against it.
//!
//! The server pairs the first two TCP connections into a match, assigns
//! marks, enforces turns and declares the result. Every message is a
//! single-line XML record (see [`velha_protocol`]). A third connection
//! during a game is closed straight away.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use velha::prelude::*;
//!
//! # async fn run() -> Result<(), VelhaError> {
//! let server = ServerBuilder::new()
//!     .bind("127.0.0.1:9123")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```
//!
//! ## Layers
//!
//! ```text
//! velha            server, connection handler, bot, binaries
//!   velha-match    slots, turns, match actor
//!   velha-protocol MatchState records, XML codec
//!   velha-engine   board, rules, move selector
//!   velha-transport TCP line transport
//! ```

pub mod bot;
mod config;
mod error;
mod handler;
mod server;

pub use config::{BotConfig, ServerConfig, DEFAULT_BIND_ADDR, DEFAULT_SERVER_ADDR};
pub use error::VelhaError;
pub use server::{Server, ServerBuilder};

/// Everything a binary or integration test usually needs.
pub mod prelude {
    pub use crate::bot::play;
    pub use crate::{BotConfig, Server, ServerBuilder, ServerConfig, VelhaError};
    pub use velha_engine::{Board, Cell, Difficulty, Mark, select_move};
    pub use velha_match::{MatchHandle, MatchPhase, MatchSnapshot};
    pub use velha_protocol::{Codec, MatchState, MatchStatus, XmlCodec};
    pub use velha_transport::{Connection, ConnectionId, TcpLineConnection};
}
