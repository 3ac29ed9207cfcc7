//! # Middleware Module
//!
//! Request interceptors for cross-cutting concerns.
//!
//! - `auth`: rejects requests whose session holds no authenticated username

pub mod auth;
