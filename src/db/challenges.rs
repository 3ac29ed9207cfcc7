//! # Challenge Manager
//!
//! Issues and consumes the single-use random challenges that anchor every
//! ceremony. At most one challenge is outstanding per (username, ceremony
//! type); issuing again overwrites (last-write-wins), and consuming removes
//! the row no matter the outcome, so a challenge can never be replayed.

use crate::db::models::ChallengeRow;
use crate::error::{AppError, AppResult};
use aws_lc_rs::rand::{SecureRandom, SystemRandom};
use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;

/// Challenge length in bytes. WebAuthn requires at least 16; 32 matches
/// what mainstream relying parties issue.
pub const CHALLENGE_LEN: usize = 32;

/// Which ceremony a challenge was issued for. A registration challenge
/// cannot be consumed by an authentication ceremony or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeremonyType {
    Registration,
    Authentication,
}

impl CeremonyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CeremonyType::Registration => "registration",
            CeremonyType::Authentication => "authentication",
        }
    }
}

/// Why a consume failed. The ceremony verifier collapses all three
/// sub-cases into one client-visible category.
#[derive(Error, Debug)]
pub enum ChallengeError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No challenge outstanding for the key, or it was already consumed.
    #[error("no challenge outstanding")]
    NotFound,

    /// A challenge existed but its expiry had passed.
    #[error("challenge expired")]
    Expired,

    /// The presented value differs from the stored one.
    #[error("challenge value mismatch")]
    Mismatch,
}

/// Issue a fresh challenge for (username, ceremony type), overwriting any
/// prior unconsumed challenge for that key. Returns the challenge bytes.
pub async fn issue(
    pool: &SqlitePool,
    username: &str,
    ceremony_type: CeremonyType,
    ttl_secs: i64,
) -> AppResult<Vec<u8>> {
    let rng = SystemRandom::new();
    let mut value = vec![0u8; CHALLENGE_LEN];
    rng.fill(&mut value)
        .map_err(|_| AppError::Internal("failed to generate random challenge".to_string()))?;

    let now = Utc::now();
    let expires = now + chrono::Duration::seconds(ttl_secs);

    sqlx::query(
        "INSERT OR REPLACE INTO challenges (username, ceremony_type, value, created_at, expires_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(username)
    .bind(ceremony_type.as_str())
    .bind(&value)
    .bind(now.to_rfc3339())
    .bind(expires.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(value)
}

/// Consume the stored challenge for (username, ceremony type), comparing it
/// against the value the client echoed back.
///
/// The row is deleted atomically up front, before expiry and value checks,
/// so every outcome (success, expiry, mismatch) spends the challenge.
/// A consume racing a fresh issue compares against whichever value was
/// stored last; a consume racing another consume finds nothing.
pub async fn consume(
    pool: &SqlitePool,
    username: &str,
    ceremony_type: CeremonyType,
    presented: &[u8],
) -> Result<(), ChallengeError> {
    let row = sqlx::query_as::<_, ChallengeRow>(
        "DELETE FROM challenges
         WHERE username = ? AND ceremony_type = ?
         RETURNING username, ceremony_type, value, created_at, expires_at",
    )
    .bind(username)
    .bind(ceremony_type.as_str())
    .fetch_optional(pool)
    .await?;

    let row = row.ok_or(ChallengeError::NotFound)?;

    let expires_at = chrono::DateTime::parse_from_rfc3339(&row.expires_at)
        .map_err(|_| ChallengeError::NotFound)?;

    if Utc::now() > expires_at {
        return Err(ChallengeError::Expired);
    }

    if row.value != presented {
        return Err(ChallengeError::Mismatch);
    }

    Ok(())
}

/// Delete expired-but-unconsumed challenges. Run periodically from a
/// background task; bounds store size, not correctness.
pub async fn cleanup_expired(pool: &SqlitePool) -> AppResult<()> {
    let now = Utc::now().to_rfc3339();

    sqlx::query("DELETE FROM challenges WHERE expires_at < ?")
        .bind(&now)
        .execute(pool)
        .await?;

    Ok(())
}
