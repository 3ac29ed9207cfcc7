//! # Error Handling
//!
//! Two error layers live here:
//! - [`CeremonyError`]: the reasons a WebAuthn ceremony is rejected. Every
//!   parse and verify step in the ceremony engine returns one of these.
//! - [`AppError`]: the application-wide error type that handlers return.
//!   It wraps ceremony rejections alongside database and serialization
//!   failures, and converts into an HTTP response.
//!
//! All failures are per-request; none halt the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Rejection reasons for registration and authentication ceremonies.
///
/// A ceremony aborts on the first failing check, with no partial state
/// mutation. The consumed challenge is never restored; the client must
/// start a fresh ceremony with a fresh challenge.
#[derive(Error, Debug)]
pub enum CeremonyError {
    /// The response is structurally invalid (bad base64, bad JSON/CBOR,
    /// truncated authenticator data, missing fields).
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The client data type marker does not match the ceremony being
    /// verified ("webauthn.create" vs "webauthn.get").
    #[error("client data type mismatch")]
    TypeMismatch,

    /// The presented challenge is expired, unknown, or does not match the
    /// one issued. Collapsed to a single category so the client cannot
    /// tell which sub-case occurred.
    #[error("challenge invalid")]
    ChallengeInvalid,

    /// The client data origin differs from the configured expected origin.
    #[error("origin mismatch")]
    OriginMismatch,

    /// The RP ID hash in the authenticator data does not match the
    /// configured RP ID.
    #[error("RP ID mismatch")]
    RpIdMismatch,

    /// Cryptographic verification failed, or the attestation format /
    /// algorithm is unsupported.
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),

    /// Registration presented a credential id that already exists,
    /// for any user.
    #[error("credential already registered")]
    CredentialAlreadyRegistered,

    /// Authentication presented a credential id with no stored record.
    #[error("unknown credential")]
    UnknownCredential,

    /// The credential exists but belongs to a different user than the
    /// one authenticating.
    #[error("credential owned by another user")]
    UsernameMismatch,

    /// The sign counter did not advance past the stored value. The
    /// authenticator may have been cloned; the attempt is rejected and
    /// stored state is left untouched.
    #[error("sign counter did not advance (possible cloned authenticator)")]
    CounterReplaySuspected,
}

/// Application-wide error type returned by handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A WebAuthn ceremony was rejected. See [`CeremonyError`].
    #[error("Ceremony rejected: {0}")]
    Ceremony(#[from] CeremonyError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                // Generic message, don't leak database internals
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Ceremony(CeremonyError::CounterReplaySuspected) => {
                // Operator-visible: a non-advancing counter suggests a
                // cloned authenticator, not an ordinary bad request.
                tracing::warn!("Ceremony rejected: sign counter did not advance");
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Ceremony(e) => {
                tracing::debug!("Ceremony rejected: {}", e);
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Serialization error".to_string(),
                )
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Convenience alias used throughout the crate.
pub type AppResult<T> = Result<T, AppError>;
