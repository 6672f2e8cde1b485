//! `velha-bot`: plays one match against a server and prints the result.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use velha::{BotConfig, DEFAULT_SERVER_ADDR, VelhaError, bot};
use velha_engine::Difficulty;

#[derive(Parser, Debug)]
#[command(name = "velha-bot", about = "Tic-tac-toe bot client", version)]
struct Cli {
    /// Server address to dial
    #[arg(long, env = "VELHA_SERVER", default_value = DEFAULT_SERVER_ADDR)]
    server: String,

    /// 0 plays almost blindly, 10 always blocks
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(0..=10))]
    difficulty: u8,

    /// Seed for the bot's random draws
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
    let config = BotConfig {
        server_addr: cli.server,
        difficulty: Difficulty::new(cli.difficulty)?,
        seed: cli.seed,
    };

    let status = bot::play(&config).await?;
    println!("{status}");
    Ok(())
}
