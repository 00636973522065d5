//! Server configuration.
//!
//! Every option can be given as a command line flag or an environment variable.
//! A `.env` file is loaded by the binary before parsing.

use std::time::Duration;

use clap::Args;

/// Signing secret used when none is configured
pub const DEFAULT_JWT_SECRET: &str = "dev_secret_change_me";

#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// Secret used to sign and verify identity tokens
    #[arg(long, env = "JWT_SECRET", default_value = DEFAULT_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    /// Lifetime of issued tokens, in seconds
    #[arg(long, env = "HIROBA_TOKEN_TTL_SECS", default_value_t = 7200)]
    pub token_ttl_secs: u64,

    /// Upper bound for token verification during the handshake, in milliseconds
    #[arg(long, env = "HIROBA_HANDSHAKE_TIMEOUT_MS", default_value_t = 5000)]
    pub handshake_timeout_ms: u64,

    /// Outbound queue size per connection; events for a full queue are dropped
    #[arg(long, env = "HIROBA_OUTBOUND_CAPACITY", default_value_t = 256, value_parser = parse_capacity)]
    pub outbound_capacity: usize,

    /// Number of recent messages sent to a client after the handshake
    #[arg(long, env = "HIROBA_BACKFILL_LIMIT", default_value_t = 50)]
    pub backfill_limit: usize,
}

impl ServerConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_secs: 7200,
            handshake_timeout_ms: 5000,
            outbound_capacity: 256,
            backfill_limit: crate::domain::DEFAULT_BACKFILL_LIMIT,
        }
    }
}

fn parse_capacity(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("capacity must be at least 1".to_string()),
        Ok(capacity) => Ok(capacity),
        Err(e) => Err(e.to_string()),
    }
}
