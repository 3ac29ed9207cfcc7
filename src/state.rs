//! # Application State
//!
//! Shared state handed to every request handler: the SQLite connection pool
//! and the relying-party identity the ceremony engine verifies against.
//! Axum clones the state per request, which is cheap (pool handle + Arc).

use crate::config::Config;
use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;

/// The relying-party identity this server represents.
///
/// Every ceremony is verified against these values: the origin must match
/// the signed client data exactly, and the SHA-256 of the RP ID must match
/// the hash embedded in the authenticator data.
#[derive(Debug)]
pub struct RelyingParty {
    /// RP ID, typically the bare domain ("example.com", "localhost").
    pub id: String,

    /// Expected origin, the full URL ("https://example.com").
    pub origin: String,

    /// Human-readable name shown to users during passkey creation.
    pub name: String,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool backing users, credentials, challenges and
    /// sessions.
    pub db: SqlitePool,

    /// Relying-party identity, shared read-only across requests.
    pub rp: Arc<RelyingParty>,

    /// Lifetime of issued challenges in seconds.
    pub challenge_ttl_secs: i64,

    /// Client-side ceremony timeout in milliseconds, echoed in options
    /// payloads.
    pub ceremony_timeout_ms: u64,
}

impl AppState {
    /// Connect to the database, run embedded migrations, and build the
    /// relying-party identity from the configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = SqlitePool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&db).await?;

        let rp = Arc::new(RelyingParty {
            id: config.rp_id.clone(),
            origin: config.rp_origin.clone(),
            name: config.rp_name.clone(),
        });

        Ok(AppState {
            db,
            rp,
            challenge_ttl_secs: config.challenge_ttl_secs,
            ceremony_timeout_ms: config.ceremony_timeout_ms,
        })
    }
}
