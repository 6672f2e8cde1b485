//! Per-connection handler.
//!
//! One task per TCP connection. It seats the connection in the match, then
//! pumps lines both ways until either side closes: inbound lines go to the
//! match actor, outbound items from the actor go to the socket.

use tokio::sync::mpsc;
use velha_match::{MatchError, MatchHandle, Outbound};
use velha_transport::{Connection, ConnectionId, TcpLineConnection};

use crate::VelhaError;

/// Reports the disconnect to the match when the handler exits, however it
/// exits.
struct DisconnectGuard {
    conn: ConnectionId,
    matches: MatchHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let conn = self.conn;
        let matches = self.matches.clone();
        tokio::spawn(async move {
            if matches.disconnect(conn).await.is_err() {
                tracing::debug!(%conn, "match gone before disconnect");
            }
        });
    }
}

pub(crate) async fn handle_connection(
    conn: TcpLineConnection,
    matches: MatchHandle,
) -> Result<(), VelhaError> {
    let conn_id = conn.id();
    let (tx, mut rx) = mpsc::unbounded_channel();

    match matches.connect(conn_id, conn.peer_addr(), tx).await {
        Ok(mark) => {
            tracing::info!(conn = %conn_id, peer = %conn.peer_addr(), %mark, "player seated");
        }
        Err(MatchError::MatchFull(_)) => {
            tracing::info!(conn = %conn_id, peer = %conn.peer_addr(), "match full, closing");
            conn.close().await?;
            return Ok(());
        }
        Err(e) => {
            conn.close().await?;
            return Err(e.into());
        }
    }

    // Seated: from here on every exit must free the slot.
    let _guard = DisconnectGuard {
        conn: conn_id,
        matches: matches.clone(),
    };

    loop {
        tokio::select! {
            biased;

            outbound = rx.recv() => match outbound {
                Some(Outbound::Line(line)) => {
                    if let Err(e) = conn.send(&line).await {
                        tracing::warn!(conn = %conn_id, error = %e, "send failed");
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    conn.close().await?;
                    break;
                }
            },

            inbound = conn.recv() => match inbound {
                Ok(Some(line)) => {
                    tracing::debug!(conn = %conn_id, %line, "received line");
                    matches.deliver(conn_id, line).await?;
                }
                Ok(None) => {
                    tracing::info!(conn = %conn_id, "peer closed connection");
                    break;
                }
                Err(e) => {
                    tracing::debug!(conn = %conn_id, error = %e, "receive failed");
                    break;
                }
            },
        }
    }

    Ok(())
}
