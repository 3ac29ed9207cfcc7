use crate::db::models::User;
use crate::error::AppResult;
use sqlx::SqlitePool;

/// Look up a user by username. Returns `None` for unknown usernames so
/// callers can decide whether absence is an error (authentication options
/// deliberately treat it as not-an-error to avoid username enumeration).
pub async fn find_by_username(pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Fetch the user for a username, creating it if absent.
///
/// Registration options must succeed for any syntactically valid username,
/// whether or not it has been seen before, so the options path upserts.
pub async fn get_or_create(
    pool: &SqlitePool,
    username: &str,
    display_name: &str,
) -> AppResult<User> {
    if let Some(user) = find_by_username(pool, username).await? {
        return Ok(user);
    }

    let user = User::new(username.to_string(), display_name.to_string());

    // A concurrent insert of the same username loses harmlessly here; the
    // existing row wins and is re-read below.
    sqlx::query(
        "INSERT INTO users (username, user_handle, display_name, created_at)
         VALUES (?, ?, ?, ?)
         ON CONFLICT (username) DO NOTHING",
    )
    .bind(&user.username)
    .bind(&user.user_handle)
    .bind(&user.display_name)
    .bind(&user.created_at)
    .execute(pool)
    .await?;

    match find_by_username(pool, username).await? {
        Some(user) => Ok(user),
        None => Err(sqlx::Error::RowNotFound.into()),
    }
}
