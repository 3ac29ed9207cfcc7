//! # WebAuthn Ceremony Engine
//!
//! The relying-party core: options generation and response verification for
//! both ceremonies, implemented directly over the wire formats.
//!
//! ## Submodules
//! - `types`: options payloads and client response types (the protocol
//!   boundary; responses are decoded into tagged structs here, never
//!   inspected as loose JSON downstream)
//! - `client_data`: collected client data parsing and checks
//! - `authenticator_data`: the binary authenticator data blob, including
//!   attested credential data and COSE keys
//! - `attestation`: CBOR attestation object parsing and verification
//! - `signature`: COSE signature verification (EdDSA, ES256, RS256)
//! - `registration` / `authentication`: the ceremony drivers, start
//!   (options) and finish (verify) halves

pub mod attestation;
pub mod authentication;
pub mod authenticator_data;
pub mod client_data;
pub mod registration;
pub mod signature;
pub mod types;

#[cfg(test)]
mod tests;

use crate::error::CeremonyError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Encode bytes as base64url without padding, the encoding WebAuthn uses
/// for every binary field on the wire.
pub(crate) fn base64_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode a base64url (no padding) string from a client response.
pub(crate) fn base64_decode(s: &str) -> Result<Vec<u8>, CeremonyError> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| CeremonyError::MalformedResponse(format!("base64 decode error: {}", e)))
}
