//! # Credential Store
//!
//! Durable mapping from credential id to public key, owner, and sign
//! counter. Credential ids are globally unique across all users; the
//! username index serves allow-lists and exclusion lists.

use crate::db::models::CredentialRecord;
use crate::error::AppResult;
use chrono::Utc;
use sqlx::SqlitePool;

/// Insert a newly registered credential.
///
/// The primary key on `credential_id` enforces global uniqueness; the
/// ceremony verifier checks for duplicates first so it can report the
/// dedicated rejection category instead of a database error.
pub async fn insert(
    pool: &SqlitePool,
    credential_id: &[u8],
    username: &str,
    public_key: &[u8],
    algorithm: i64,
    sign_counter: i64,
    transports: Option<&[String]>,
) -> AppResult<()> {
    let transports_json = transports.map(serde_json::to_string).transpose()?;
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO credentials
         (credential_id, username, public_key, algorithm, sign_counter, transports, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(credential_id)
    .bind(username)
    .bind(public_key)
    .bind(algorithm)
    .bind(sign_counter)
    .bind(transports_json)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// All credentials registered to a username, empty for unknown users.
pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> AppResult<Vec<CredentialRecord>> {
    let credentials = sqlx::query_as::<_, CredentialRecord>(
        "SELECT * FROM credentials WHERE username = ? ORDER BY created_at",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    Ok(credentials)
}

/// Look up a single credential by its id.
pub async fn find_by_credential_id(
    pool: &SqlitePool,
    credential_id: &[u8],
) -> AppResult<Option<CredentialRecord>> {
    let credential = sqlx::query_as::<_, CredentialRecord>(
        "SELECT * FROM credentials WHERE credential_id = ?",
    )
    .bind(credential_id)
    .fetch_optional(pool)
    .await?;

    Ok(credential)
}

/// Persist the sign counter accepted by a successful authentication, and
/// stamp last_used_at.
pub async fn update_sign_counter(
    pool: &SqlitePool,
    credential_id: &[u8],
    new_counter: i64,
) -> AppResult<()> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE credentials
         SET sign_counter = ?, last_used_at = ?
         WHERE credential_id = ?",
    )
    .bind(new_counter)
    .bind(now)
    .bind(credential_id)
    .execute(pool)
    .await?;

    Ok(())
}
