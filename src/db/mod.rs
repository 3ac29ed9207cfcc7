//! # Database Module
//!
//! Storage layer, one submodule per table:
//! - `models`: row structs (User, CredentialRecord, ChallengeRow)
//! - `users`: username -> user handle mapping
//! - `credentials`: the credential store (public keys + sign counters)
//! - `challenges`: the challenge manager (single-use ceremony challenges)

pub mod challenges;
pub mod credentials;
pub mod models;
pub mod users;
