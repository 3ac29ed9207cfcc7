//! # Passkey Relying-Party Server
//!
//! A WebAuthn/FIDO2 relying-party server: issues registration and
//! authentication options, verifies the signed responses produced by
//! platform credential managers, and establishes cookie sessions for
//! verified users. The ceremony engine lives in the `webauthn` module;
//! everything else is HTTP and storage plumbing around it.

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod state;
mod webauthn;

use crate::config::Config;
use crate::handlers::auth::*;
use crate::handlers::health::health_check;
use crate::handlers::users::get_current_user;
use crate::state::AppState;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,passkey_rp_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let app_state = AppState::new(&config).await?;
    tracing::info!("Application state initialized");

    // Expired-but-unconsumed challenges are only a storage concern, not a
    // correctness one (expiry is checked at consume time), so a periodic
    // sweep is enough.
    let cleanup_pool = app_state.db.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(600));
        loop {
            interval.tick().await;
            tracing::debug!("Running challenge cleanup task");
            if let Err(e) = crate::db::challenges::cleanup_expired(&cleanup_pool).await {
                tracing::error!("Challenge cleanup failed: {:?}", e);
            }
        }
    });

    // Sessions are stored server-side in SQLite; the client only holds the
    // opaque token cookie.
    let session_store = SqliteStore::new(app_state.db.clone());
    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    // The demo client may run from any origin; restrict this in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected_routes = Router::new()
        .route("/api/users/me", get(get_current_user))
        .layer(axum_middleware::from_fn(middleware::auth::require_auth))
        .with_state(app_state.clone());

    let app = Router::new()
        .route("/health", get(health_check))
        // Registration ceremony
        .route(
            "/generate-registration-options",
            get(generate_registration_options),
        )
        .route("/verify-registration", post(verify_registration))
        // Authentication ceremony
        .route(
            "/generate-authentication-options",
            get(generate_authentication_options),
        )
        .route("/verify-authentication", post(verify_authentication))
        // Session management
        .route("/logout", post(logout))
        .route("/session", get(session_info))
        .merge(protected_routes)
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let bind_addr = config.bind_address();
    tracing::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
