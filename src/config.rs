//! # Configuration Management
//!
//! Configuration comes from environment variables (12-factor style), with a
//! `.env` file loaded for local development.
//!
//! ## Environment Variables
//! - `HOST`: Server bind address (default: 127.0.0.1)
//! - `PORT`: Server port (default: 8080)
//! - `DATABASE_URL`: SQLite database connection string
//! - `RP_ID`: WebAuthn Relying Party ID (usually your domain)
//! - `RP_ORIGIN`: WebAuthn Relying Party Origin (full URL)
//! - `RP_NAME`: Human-readable name for your service
//! - `CHALLENGE_TTL_SECS`: Lifetime of issued challenges (default: 300)
//! - `CEREMONY_TIMEOUT_MS`: Timeout sent to clients in options payloads
//!   (default: 60000)

use anyhow::Result;
use std::env;

/// Application configuration.
///
/// The RP ID must match the domain the relying party is served from
/// ("localhost" in development, "example.com" in production), and the RP
/// origin is the full URL clients present in their signed client data.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host/IP address to bind to.
    pub host: String,

    /// Server port number.
    pub port: u16,

    /// SQLite database connection URL, e.g. "sqlite:passkey.db?mode=rwc".
    pub database_url: String,

    /// WebAuthn Relying Party ID (domain, no protocol or port).
    pub rp_id: String,

    /// WebAuthn Relying Party Origin (full URL including protocol).
    pub rp_origin: String,

    /// Human-readable relying party name shown during passkey creation.
    pub rp_name: String,

    /// How long an issued challenge stays valid. WebAuthn recommends a
    /// 2-5 minute window; too short and users cannot finish the
    /// platform prompt, too long and the attack window grows.
    pub challenge_ttl_secs: i64,

    /// Client-side ceremony timeout, in milliseconds, included in the
    /// registration and authentication options payloads.
    pub ceremony_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// development defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (dotenvy doesn't error if missing)
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:passkey.db?mode=rwc".to_string()),

            rp_id: env::var("RP_ID").unwrap_or_else(|_| "localhost".to_string()),

            rp_origin: env::var("RP_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),

            rp_name: env::var("RP_NAME").unwrap_or_else(|_| "Passkey Demo".to_string()),

            challenge_ttl_secs: env::var("CHALLENGE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,

            ceremony_timeout_ms: env::var("CEREMONY_TIMEOUT_MS")
                .unwrap_or_else(|_| "60000".to_string())
                .parse()?,
        })
    }

    /// Socket address string for `TcpListener::bind`, e.g. "127.0.0.1:8080".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
