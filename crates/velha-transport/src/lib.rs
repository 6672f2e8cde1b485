//! Transport abstraction layer for Velha.
//!
//! Provides the [`Transport`] and [`Connection`] traits. A connection moves
//! whole lines of text: the framing (one message per line) belongs to the
//! transport, so the layers above never see partial reads.
//!
//! # Feature Flags
//!
//! - `tcp` (default): newline-delimited TCP via tokio

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "tcp")]
mod tcp;

pub use error::TransportError;
#[cfg(feature = "tcp")]
pub use tcp::{MAX_LINE_LENGTH, TcpLineConnection, TcpLineTransport};

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Stops handing out new connections. Connections already accepted
    /// are unaffected.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// A single connection that exchanges lines of text.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one line. The transport appends the line terminator.
    async fn send(&self, line: &str) -> Result<(), Self::Error>;

    /// Receives the next line, without its terminator.
    ///
    /// Returns `Ok(None)` when the peer has closed the stream.
    /// Must be cancel-safe: dropping the future loses no data.
    async fn recv(&self) -> Result<Option<String>, Self::Error>;

    /// Closes the sending side. The peer sees end-of-stream.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// The remote address, for diagnostics.
    fn peer_addr(&self) -> SocketAddr;
}
