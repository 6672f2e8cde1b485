//! Newline-delimited TCP transport.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> ConnectionId {
    ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// Longest line, in bytes and excluding the newline, that a connection will
/// buffer. A longer line fails the receive.
pub const MAX_LINE_LENGTH: usize = 1024;

/// A [`Transport`] that accepts plain TCP connections carrying one UTF-8
/// message per line.
pub struct TcpLineTransport {
    listener: TcpListener,
    shut_down: AtomicBool,
}

impl TcpLineTransport {
    /// Binds a listener to the given address. Port 0 picks a free port;
    /// read it back with [`local_addr`](Self::local_addr).
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP line transport listening");
        Ok(Self {
            listener,
            shut_down: AtomicBool::new(false),
        })
    }

    /// The address the listener is actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }
}

impl Transport for TcpLineTransport {
    type Connection = TcpLineConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(TransportError::Shutdown);
        }
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let conn = TcpLineConnection::from_stream(stream, addr);
        tracing::debug!(id = %conn.id, %addr, "accepted TCP connection");
        Ok(conn)
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        self.shut_down.store(true, Ordering::Release);
        Ok(())
    }
}

/// A single TCP connection, split into a line reader and a writer so that
/// a task can wait for input while another part of it sends.
pub struct TcpLineConnection {
    id: ConnectionId,
    peer: SocketAddr,
    reader: Mutex<LineReader>,
    writer: Mutex<OwnedWriteHalf>,
    closed: AtomicBool,
}

impl TcpLineConnection {
    /// Dials a server. Used by clients such as the bot.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::ConnectFailed)?;
        let peer = stream.peer_addr().map_err(TransportError::ConnectFailed)?;
        let conn = Self::from_stream(stream, peer);
        tracing::debug!(id = %conn.id, %peer, "connected");
        Ok(conn)
    }

    fn from_stream(stream: TcpStream, peer: SocketAddr) -> Self {
        let (read, write) = stream.into_split();
        Self {
            id: next_id(),
            peer,
            reader: Mutex::new(LineReader::new(read, MAX_LINE_LENGTH)),
            writer: Mutex::new(write),
            closed: AtomicBool::new(false),
        }
    }
}

impl Connection for TcpLineConnection {
    type Error = TransportError;

    async fn send(&self, line: &str) -> Result<(), Self::Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::ConnectionClosed(self.id.to_string()));
        }
        let mut framed = String::with_capacity(line.len() + 1);
        framed.push_str(line);
        framed.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(framed.as_bytes())
            .await
            .map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<String>, Self::Error> {
        // `next_line` is cancel-safe, and so is waiting on the mutex.
        self.reader
            .lock()
            .await
            .next_line()
            .await
            .map_err(TransportError::ReceiveFailed)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

// ---------------------------------------------------------------------------
// LineReader
// ---------------------------------------------------------------------------

/// Splits the read half into lines of at most `max_len` bytes.
///
/// Bytes of an unfinished line are kept in `pending` between calls, so a
/// `next_line` future dropped mid-line loses nothing.
struct LineReader {
    inner: BufReader<OwnedReadHalf>,
    pending: Vec<u8>,
    max_len: usize,
}

impl LineReader {
    fn new(read: OwnedReadHalf, max_len: usize) -> Self {
        Self {
            inner: BufReader::new(read),
            pending: Vec::new(),
            max_len,
        }
    }

    /// The next line without its `\n` (or `\r\n`), or `None` at end of
    /// stream. A final line with no newline is still returned.
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let available = self.inner.fill_buf().await?;
            if available.is_empty() {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                return self.take_line().map(Some);
            }

            let newline = available.iter().position(|&b| b == b'\n');
            let chunk = &available[..newline.unwrap_or(available.len())];
            // One spare byte for the `\r` of a `\r\n` terminator.
            if self.pending.len() + chunk.len() > self.max_len + 1 {
                self.pending.clear();
                return Err(self.too_long());
            }
            self.pending.extend_from_slice(chunk);

            match newline {
                Some(at) => {
                    self.inner.consume(at + 1);
                    return self.take_line().map(Some);
                }
                None => {
                    let used = available.len();
                    self.inner.consume(used);
                }
            }
        }
    }

    fn take_line(&mut self) -> io::Result<String> {
        let mut bytes = std::mem::take(&mut self.pending);
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        if bytes.len() > self.max_len {
            return Err(self.too_long());
        }
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn too_long(&self) -> io::Error {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("line longer than {} bytes", self.max_len),
        )
    }
}
