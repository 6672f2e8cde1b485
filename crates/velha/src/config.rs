//! Server and bot configuration.

use serde::{Deserialize, Serialize};
use velha_engine::Difficulty;
use velha_match::DEFAULT_CHANNEL_SIZE;

/// Where the server listens unless told otherwise.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9123";

/// Where the bot dials unless told otherwise.
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:9123";

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Server`](crate::Server).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind, e.g. `"0.0.0.0:9123"`. Port 0 picks a free port.
    pub bind_addr: String,

    /// Seed for the match's random source. `None` seeds from the OS, so
    /// marks and the starting player differ from run to run.
    pub seed: Option<u64>,

    /// Capacity of the match actor's command queue.
    pub channel_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            seed: None,
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// BotConfig
// ---------------------------------------------------------------------------

/// Configuration for one bot game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Server address to dial.
    pub server_addr: String,

    /// How often the bot plays its defensive steps.
    pub difficulty: Difficulty,

    /// Seed for the selector's random draws. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            difficulty: Difficulty::MAX,
            seed: None,
        }
    }
}
