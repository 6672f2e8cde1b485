//! Where the match sends its output.
//!
//! The match never touches sockets. Every reply goes through an
//! [`Outbox`], which the actor backs with per-connection channels and tests
//! back with a [`RecordingOutbox`].

use velha_transport::ConnectionId;

/// Sink for the match's output: lines to send and connections to close.
///
/// Both calls are fire-and-forget. An outbox that cannot reach a
/// connection drops the request; the match learns about the loss through
/// a later disconnect.
pub trait Outbox {
    /// Queues one encoded line for `conn`.
    fn send(&mut self, conn: ConnectionId, line: &str);

    /// Asks for `conn` to be closed after everything queued before it.
    fn close(&mut self, conn: ConnectionId);
}

impl<O: Outbox + ?Sized> Outbox for &mut O {
    fn send(&mut self, conn: ConnectionId, line: &str) {
        (**self).send(conn, line);
    }

    fn close(&mut self, conn: ConnectionId) {
        (**self).close(conn);
    }
}

/// One thing the match asked an outbox to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboxEvent {
    Sent(ConnectionId, String),
    Closed(ConnectionId),
}

/// An [`Outbox`] that records every call, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutbox {
    events: Vec<OutboxEvent>,
}

impl RecordingOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn events(&self) -> &[OutboxEvent] {
        &self.events
    }

    /// Drains the recorded events.
    pub fn take(&mut self) -> Vec<OutboxEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Lines sent to `conn`, in order.
    pub fn sent_to(&self, conn: ConnectionId) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                OutboxEvent::Sent(to, line) if *to == conn => Some(line.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Connections closed, in order.
    pub fn closed(&self) -> Vec<ConnectionId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                OutboxEvent::Closed(conn) => Some(*conn),
                OutboxEvent::Sent(..) => None,
            })
            .collect()
    }
}

impl Outbox for RecordingOutbox {
    fn send(&mut self, conn: ConnectionId, line: &str) {
        self.events.push(OutboxEvent::Sent(conn, line.to_owned()));
    }

    fn close(&mut self, conn: ConnectionId) {
        self.events.push(OutboxEvent::Closed(conn));
    }
}
