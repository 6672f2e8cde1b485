//! Match actor: a Tokio task that owns the [`Match`].
//!
//! Connection handlers never touch the match directly. They send
//! [`MatchCommand`]s through a [`MatchHandle`], and the actor applies them
//! one at a time. Replies flow back through per-connection unbounded
//! channels as [`Outbound`] items.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::sync::{mpsc, oneshot};
use velha_engine::{Board, Mark, RandomSource};
use velha_protocol::Codec;
use velha_transport::ConnectionId;

use crate::{Match, MatchError, MatchPhase, Outbox};

/// An item for a connection handler to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Write this line to the peer.
    Line(String),
    /// Close the connection. Nothing follows.
    Close,
}

/// Channel sender for delivering outbound items to a connection handler.
pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

/// Commands sent to a match actor through its channel.
pub(crate) enum MatchCommand {
    /// Seat a new connection. Replies with its mark or a refusal.
    Connect {
        conn: ConnectionId,
        addr: SocketAddr,
        sender: OutboundSender,
        reply: oneshot::Sender<Result<Mark, MatchError>>,
    },

    /// An inbound line from a connection.
    Deliver { conn: ConnectionId, line: String },

    /// The connection went away.
    Disconnect { conn: ConnectionId },

    /// Request a snapshot of the match.
    Snapshot { reply: oneshot::Sender<MatchSnapshot> },

    /// Stop the actor.
    Shutdown,
}

/// A point-in-time view of a match, for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSnapshot {
    pub phase: MatchPhase,
    /// Seated connections and their marks, in slot order.
    pub slots: Vec<(ConnectionId, Mark)>,
    /// The turn pointer (index into `slots`).
    pub turn: Option<usize>,
    pub board: Board,
}

/// Handle to a running match actor. Cheap to clone.
#[derive(Clone)]
pub struct MatchHandle {
    sender: mpsc::Sender<MatchCommand>,
}

impl MatchHandle {
    /// Asks the match to seat `conn`. Outbound items for it arrive on the
    /// receiving end of `sender`.
    ///
    /// # Errors
    /// [`MatchError::MatchFull`] if two players are already seated (an
    /// [`Outbound::Close`] is queued as well), or
    /// [`MatchError::Unavailable`] if the actor is gone.
    pub async fn connect(
        &self,
        conn: ConnectionId,
        addr: SocketAddr,
        sender: OutboundSender,
    ) -> Result<Mark, MatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(MatchCommand::Connect {
                conn,
                addr,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| MatchError::Unavailable)?;
        reply_rx.await.map_err(|_| MatchError::Unavailable)?
    }

    /// Forwards one inbound line (fire-and-forget).
    pub async fn deliver(&self, conn: ConnectionId, line: String) -> Result<(), MatchError> {
        self.sender
            .send(MatchCommand::Deliver { conn, line })
            .await
            .map_err(|_| MatchError::Unavailable)
    }

    /// Reports that `conn` went away (fire-and-forget).
    pub async fn disconnect(&self, conn: ConnectionId) -> Result<(), MatchError> {
        self.sender
            .send(MatchCommand::Disconnect { conn })
            .await
            .map_err(|_| MatchError::Unavailable)
    }

    /// Requests the current state of the match.
    pub async fn snapshot(&self) -> Result<MatchSnapshot, MatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(MatchCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| MatchError::Unavailable)?;
        reply_rx.await.map_err(|_| MatchError::Unavailable)
    }

    /// Tells the actor to stop.
    pub async fn shutdown(&self) -> Result<(), MatchError> {
        self.sender
            .send(MatchCommand::Shutdown)
            .await
            .map_err(|_| MatchError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// ChannelOutbox
// ---------------------------------------------------------------------------

/// The actor's [`Outbox`]: one unbounded channel per seated or
/// connecting connection.
#[derive(Default)]
struct ChannelOutbox {
    senders: HashMap<ConnectionId, OutboundSender>,
}

impl ChannelOutbox {
    fn register(&mut self, conn: ConnectionId, sender: OutboundSender) {
        self.senders.insert(conn, sender);
    }

    fn unregister(&mut self, conn: ConnectionId) {
        self.senders.remove(&conn);
    }
}

impl Outbox for ChannelOutbox {
    fn send(&mut self, conn: ConnectionId, line: &str) {
        let Some(sender) = self.senders.get(&conn) else {
            tracing::debug!(%conn, "no outbound channel, dropping line");
            return;
        };
        if sender.send(Outbound::Line(line.to_owned())).is_err() {
            tracing::warn!(%conn, "connection handler gone, dropping line");
        }
    }

    fn close(&mut self, conn: ConnectionId) {
        // After a close nothing else may be sent, so the sender goes too.
        if let Some(sender) = self.senders.remove(&conn) {
            let _ = sender.send(Outbound::Close);
        }
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The internal actor state. Runs inside a Tokio task.
struct MatchActor<C: Codec, R: RandomSource> {
    game: Match<C, R>,
    outbox: ChannelOutbox,
    receiver: mpsc::Receiver<MatchCommand>,
}

impl<C: Codec, R: RandomSource + Send + 'static> MatchActor<C, R> {
    /// Runs the actor loop, processing commands until shutdown or until
    /// every handle is dropped.
    async fn run(mut self) {
        tracing::info!("match actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                MatchCommand::Connect {
                    conn,
                    addr,
                    sender,
                    reply,
                } => {
                    self.outbox.register(conn, sender);
                    let result = self.game.on_connect(conn, addr, &mut self.outbox);
                    let _ = reply.send(result);
                }
                MatchCommand::Deliver { conn, line } => {
                    self.game.on_message(conn, &line, &mut self.outbox);
                }
                MatchCommand::Disconnect { conn } => {
                    self.game.on_disconnect(conn, &mut self.outbox);
                    self.outbox.unregister(conn);
                }
                MatchCommand::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                MatchCommand::Shutdown => {
                    tracing::info!("match actor shutting down");
                    break;
                }
            }
        }

        tracing::info!("match actor stopped");
    }

    fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            phase: self.game.phase(),
            slots: self
                .game
                .slots()
                .iter()
                .map(|slot| (slot.conn, slot.mark))
                .collect(),
            turn: self.game.turn(),
            board: *self.game.board(),
        }
    }
}

/// Spawns a match actor task and returns a handle to communicate with it.
///
/// `channel_size` bounds the command queue; when it fills up, callers
/// wait.
pub fn spawn_match<C, R>(codec: C, rng: R, channel_size: usize) -> MatchHandle
where
    C: Codec,
    R: RandomSource + Send + 'static,
{
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = MatchActor {
        game: Match::new(codec, rng),
        outbox: ChannelOutbox::default(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    MatchHandle { sender: tx }
}
