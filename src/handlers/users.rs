//! # User Handlers
//!
//! Profile endpoint for the signed-in user. Protected by the session
//! middleware.

use crate::db::{credentials, users};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::SESSION_USERNAME_KEY;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use tower_sessions::Session;

/// GET /api/users/me
pub async fn get_current_user(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Value>> {
    let username: String = session
        .get(SESSION_USERNAME_KEY)
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let user = users::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))?;

    let credential_count = credentials::find_by_username(&state.db, &username)
        .await?
        .len();

    // Credential ids and public keys are deliberately not exposed
    Ok(Json(json!({
        "username": user.username,
        "display_name": user.display_name,
        "created_at": user.created_at,
        "credential_count": credential_count,
    })))
}
