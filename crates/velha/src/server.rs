//! The Velha server: accept loop and builder.

use std::net::SocketAddr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use velha_match::{MatchHandle, spawn_match};
use velha_protocol::XmlCodec;
use velha_transport::{TcpLineTransport, Transport, TransportError};

use crate::handler::handle_connection;
use crate::{ServerConfig, VelhaError};

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A bound server with its match actor running.
///
/// Create one with [`ServerBuilder`], then call [`run`](Self::run).
pub struct Server {
    transport: TcpLineTransport,
    matches: MatchHandle,
    local_addr: SocketAddr,
}

impl Server {
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// A handle to the match, for diagnostics and tests.
    pub fn match_handle(&self) -> MatchHandle {
        self.matches.clone()
    }

    /// Runs the accept loop until the process exits.
    pub async fn run(self) -> Result<(), VelhaError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `stop` completes.
    ///
    /// Every accepted connection gets its own handler task. Accept errors
    /// are logged and the loop continues. When `stop` fires, the transport
    /// is shut down, the loop drains to [`TransportError::Shutdown`], and
    /// the match actor is stopped.
    pub async fn run_until<F>(mut self, stop: F) -> Result<(), VelhaError>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(addr = %self.local_addr, "velha server running");

        let mut stop = std::pin::pin!(stop);
        let mut stopping = false;

        loop {
            let accepted = tokio::select! {
                () = &mut stop, if !stopping => None,
                accepted = self.transport.accept() => Some(accepted),
            };

            let Some(accepted) = accepted else {
                tracing::info!("stop requested, shutting down transport");
                stopping = true;
                self.transport.shutdown().await?;
                continue;
            };

            match accepted {
                Ok(conn) => {
                    let matches = self.matches.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, matches).await {
                            tracing::warn!(error = %e, "connection handler failed");
                        }
                    });
                }
                Err(TransportError::Shutdown) => {
                    tracing::info!("transport shut down, stopping accept loop");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept connection");
                }
            }
        }

        self.matches.shutdown().await?;
        tracing::info!("velha server stopped");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ServerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and starting a [`Server`].
///
/// ```rust,no_run
/// use velha::ServerBuilder;
///
/// # async fn run() -> Result<(), velha::VelhaError> {
/// let server = ServerBuilder::new()
///     .bind("127.0.0.1:0")
///     .seed(7)
///     .build()
///     .await?;
/// println!("listening on {}", server.local_addr());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a full [`ServerConfig`].
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the bind address.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    /// Seeds the match's random source, making marks and the starting
    /// player reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Sets the capacity of the match actor's command queue.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.config.channel_size = size;
        self
    }

    /// Binds the listener and spawns the match actor.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn build(self) -> Result<Server, VelhaError> {
        let ServerConfig {
            bind_addr,
            seed,
            channel_size,
        } = self.config;

        let transport = TcpLineTransport::bind(&bind_addr).await?;
        let local_addr = transport.local_addr()?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let matches = spawn_match(XmlCodec, rng, channel_size);

        Ok(Server {
            transport,
            matches,
            local_addr,
        })
    }
}
