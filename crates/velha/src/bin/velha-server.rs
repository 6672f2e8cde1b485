//! `velha-server`: accepts two players per match over TCP.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use velha::{DEFAULT_BIND_ADDR, ServerBuilder, VelhaError};

/// Tic-tac-toe match server speaking single-line XML records.
#[derive(Parser, Debug)]
#[command(name = "velha-server", about = "Tic-tac-toe match server", version)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "VELHA_BIND", default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// Seed for mark assignment and the starting player
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), VelhaError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut builder = ServerBuilder::new().bind(cli.bind);
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }

    builder
        .build()
        .await?
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "cannot listen for ctrl-c, running until killed");
                std::future::pending::<()>().await;
            }
        })
        .await
}
