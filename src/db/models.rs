//! # Database Models
//!
//! Row structs mapped with `sqlx::FromRow`. Timestamps are stored as
//! RFC3339 text, which is what SQLite handles most naturally.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account. Keyed by the externally supplied, case-sensitive
/// username; one user may own zero or many credentials.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub username: String,

    /// Stable 16-byte WebAuthn user handle, generated at creation and sent
    /// to authenticators as the user id.
    pub user_handle: Vec<u8>,

    pub display_name: String,

    pub created_at: String,
}

impl User {
    /// Build a new user with a fresh random handle.
    pub fn new(username: String, display_name: String) -> Self {
        Self {
            username,
            user_handle: Uuid::new_v4().into_bytes().to_vec(),
            display_name,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// A registered public-key credential.
///
/// Only the public key is stored; the private key never leaves the user's
/// authenticator. The sign counter is expected to advance strictly on every
/// successful authentication (unless the authenticator reports 0, meaning
/// counters are unsupported).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CredentialRecord {
    /// Authenticator-generated credential id, globally unique across users.
    pub credential_id: Vec<u8>,

    /// Owning username.
    pub username: String,

    /// COSE-encoded public key, exactly as attested at registration.
    pub public_key: Vec<u8>,

    /// COSE algorithm identifier (-8 EdDSA, -7 ES256, -257 RS256).
    pub algorithm: i64,

    /// Last accepted sign counter.
    pub sign_counter: i64,

    /// Optional transport hints ("usb", "nfc", ...), JSON-encoded.
    pub transports: Option<String>,

    pub created_at: String,

    /// Updated on each successful authentication.
    pub last_used_at: Option<String>,
}

/// An outstanding ceremony challenge, one per (username, ceremony type).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChallengeRow {
    pub username: String,

    pub ceremony_type: String,

    /// The random challenge bytes the client must echo back signed.
    pub value: Vec<u8>,

    pub created_at: String,

    /// Past this instant the challenge is rejected even if the value
    /// matches.
    pub expires_at: String,
}
