/// Errors that can occur in the transport layer.
///
/// The io variants keep the underlying error as `source` so logs show the
/// OS-level cause (reset, broken pipe, refused).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was already closed locally.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Writing a line failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading a line failed (including a line that is not UTF-8).
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener or accepting a connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Dialing a remote server failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}
