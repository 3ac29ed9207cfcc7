//! # Ceremony Endpoints
//!
//! The four endpoints the mobile client drives, mirroring the WebAuthn
//! two-phase shape: fetch options, then post the signed response. Session
//! issuance happens here, on the verify responses, as a tower-sessions
//! cookie.

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::webauthn::types::*;
use crate::webauthn::{authentication, registration};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_sessions::Session;

/// Session key holding the authenticated username.
pub const SESSION_USERNAME_KEY: &str = "username";

#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    pub username: String,
}

fn require_username(username: &str) -> AppResult<()> {
    if username.trim().is_empty() {
        return Err(AppError::BadRequest("username must not be empty".into()));
    }
    Ok(())
}

/// GET /generate-registration-options?username=U
pub async fn generate_registration_options(
    State(state): State<AppState>,
    Query(query): Query<OptionsQuery>,
) -> AppResult<Json<RegistrationOptions>> {
    require_username(&query.username)?;

    let options = registration::start_registration(&state, &query.username).await?;

    Ok(Json(options))
}

/// POST /verify-registration
///
/// 200 with a session cookie on success, non-200 with an error body on any
/// ceremony rejection.
pub async fn verify_registration(
    session: Session,
    State(state): State<AppState>,
    Json(req): Json<VerifyRegistrationRequest>,
) -> AppResult<Json<Value>> {
    require_username(&req.username)?;

    registration::finish_registration(&state, &req.username, &req.response).await?;

    session
        .insert(SESSION_USERNAME_KEY, &req.username)
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?;

    Ok(Json(json!({
        "verified": true,
        "username": req.username,
    })))
}

/// GET /generate-authentication-options?username=U
pub async fn generate_authentication_options(
    State(state): State<AppState>,
    Query(query): Query<OptionsQuery>,
) -> AppResult<Json<AuthenticationOptions>> {
    require_username(&query.username)?;

    let options = authentication::start_authentication(&state, &query.username).await?;

    Ok(Json(options))
}

/// POST /verify-authentication
pub async fn verify_authentication(
    session: Session,
    State(state): State<AppState>,
    Json(req): Json<VerifyAuthenticationRequest>,
) -> AppResult<Json<Value>> {
    require_username(&req.username)?;

    let username = authentication::finish_authentication(&state, &req.username, &req.response).await?;

    session
        .insert(SESSION_USERNAME_KEY, &username)
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?;

    Ok(Json(json!({
        "verified": true,
        "username": username,
    })))
}

/// POST /logout
pub async fn logout(session: Session) -> AppResult<Json<Value>> {
    session
        .delete()
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?;

    Ok(Json(json!({
        "success": true,
    })))
}

/// GET /session — tells the client whether its cookie still maps to an
/// authenticated session.
pub async fn session_info(session: Session) -> AppResult<Json<Value>> {
    let username: Option<String> = session
        .get(SESSION_USERNAME_KEY)
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?;

    match username {
        Some(username) => Ok(Json(json!({
            "authenticated": true,
            "username": username,
        }))),
        None => Ok(Json(json!({
            "authenticated": false,
        }))),
    }
}
