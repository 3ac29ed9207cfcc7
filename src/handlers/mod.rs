//! # HTTP Request Handlers
//!
//! Route handlers, one module per concern:
//! - `auth`: the four ceremony endpoints plus logout/session info
//! - `users`: current-user profile (session protected)
//! - `health`: liveness endpoint

pub mod auth;
pub mod health;
pub mod users;
