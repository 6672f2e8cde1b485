//! Wire protocol for Velha.
//!
//! Every message exchanged between a player and the server is one
//! [`MatchState`] record: whose mark it is addressed to, a [`MatchStatus`],
//! an optional move, and the full board.
//!
//! - **Types** ([`MatchState`], [`MatchStatus`]): the record itself.
//! - **Schema** ([`schema::Element`], [`schema::validate`]): the document
//!   shape a record maps to, checked on both encode and decode.
//! - **Codec** ([`Codec`] trait, [`XmlCodec`]): turns records into single
//!   lines of text and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (raw lines) and the match
//! (turns and rules). It never looks at whose turn it is; it only knows
//! whether a line is a well-formed record.
//!
//! ```text
//! Transport (lines) → Protocol (MatchState) → Match (slots, turns)
//! ```

mod codec;
mod error;
pub mod schema;
mod types;

pub use codec::Codec;
#[cfg(feature = "xml")]
pub use codec::XmlCodec;
pub use error::ProtocolError;
pub use types::{MatchState, MatchStatus};
