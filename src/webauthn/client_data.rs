//! # Collected Client Data
//!
//! Parsing and checks for the `clientDataJSON` blob every response carries.
//! The checks are split into separate methods rather than one `verify`
//! because the ceremony order interleaves them with the challenge consume:
//! type marker first, then challenge, then origin.

use std::fmt;

use crate::error::CeremonyError;

/// The ceremony a client data blob claims to belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientDataType {
    /// Registration ("webauthn.create").
    Create,
    /// Authentication ("webauthn.get").
    Get,
}

impl ClientDataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientDataType::Create => "webauthn.create",
            ClientDataType::Get => "webauthn.get",
        }
    }
}

impl fmt::Display for ClientDataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed collected client data.
#[derive(Debug)]
pub struct ClientData {
    /// The raw type marker string; compared against the expected ceremony
    /// with [`ClientData::require_type`].
    pub type_: String,

    /// The echoed challenge (base64url-encoded).
    pub challenge: String,

    /// The origin the client performed the ceremony under.
    pub origin: String,

    /// Whether the request came from a cross-origin iframe.
    pub cross_origin: bool,
}

impl ClientData {
    /// Parse client data from raw JSON bytes.
    pub fn parse(bytes: &[u8]) -> Result<ClientData, CeremonyError> {
        let json: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| CeremonyError::MalformedResponse(format!("invalid client data JSON: {}", e)))?;

        let type_ = json["type"]
            .as_str()
            .ok_or_else(|| CeremonyError::MalformedResponse("missing type in client data".into()))?
            .to_string();

        let challenge = json["challenge"]
            .as_str()
            .ok_or_else(|| {
                CeremonyError::MalformedResponse("missing challenge in client data".into())
            })?
            .to_string();

        let origin = json["origin"]
            .as_str()
            .ok_or_else(|| CeremonyError::MalformedResponse("missing origin in client data".into()))?
            .to_string();

        let cross_origin = json["crossOrigin"].as_bool().unwrap_or(false);

        Ok(ClientData {
            type_,
            challenge,
            origin,
            cross_origin,
        })
    }

    /// Decode and parse a base64url-encoded client data string, returning
    /// the parsed structure together with the raw bytes (the raw bytes are
    /// hashed into the signed payload later).
    pub fn from_base64(client_data_json: &str) -> Result<(ClientData, Vec<u8>), CeremonyError> {
        let bytes = super::base64_decode(client_data_json)?;
        let parsed = Self::parse(&bytes)?;
        Ok((parsed, bytes))
    }

    /// Check the type marker against the ceremony being verified.
    pub fn require_type(&self, expected: ClientDataType) -> Result<(), CeremonyError> {
        if self.type_ != expected.as_str() {
            return Err(CeremonyError::TypeMismatch);
        }
        Ok(())
    }

    /// Decode the echoed challenge to raw bytes.
    pub fn challenge_bytes(&self) -> Result<Vec<u8>, CeremonyError> {
        super::base64_decode(&self.challenge)
    }

    /// Check the origin against the configured expected origin, exact
    /// string match.
    pub fn require_origin(&self, expected: &str) -> Result<(), CeremonyError> {
        if self.origin != expected {
            return Err(CeremonyError::OriginMismatch);
        }
        Ok(())
    }
}
