//! # Attestation Object
//!
//! CBOR attestation object parsing and verification for registration
//! responses. Accepted formats:
//!
//! - `none`: no attestation statement; the attested key is taken on trust.
//! - `packed` self-attestation: the statement signature is verified with
//!   the attested credential key itself.
//!
//! Full attestation-chain trust evaluation (x5c paths, AAGUID metadata) is
//! deliberately out of scope; formats requiring it are rejected.

use ciborium::Value;

use crate::error::CeremonyError;
use crate::webauthn::authenticator_data::AuthenticatorData;
use crate::webauthn::signature;

/// A parsed attestation object: format marker, raw authenticator data, and
/// the format-specific attestation statement.
#[derive(Debug)]
pub struct AttestationObject {
    pub fmt: String,

    /// Raw authenticator data bytes; also part of the signed payload for
    /// formats that carry a signature.
    pub auth_data: Vec<u8>,

    att_stmt: Vec<(Value, Value)>,
}

impl AttestationObject {
    pub fn parse(bytes: &[u8]) -> Result<AttestationObject, CeremonyError> {
        let value: Value = ciborium::from_reader(bytes).map_err(|e| {
            CeremonyError::MalformedResponse(format!("invalid attestation object: {}", e))
        })?;

        let map = match value {
            Value::Map(map) => map,
            _ => {
                return Err(CeremonyError::MalformedResponse(
                    "attestation object is not a map".into(),
                ))
            }
        };

        let fmt = map
            .iter()
            .find(|(k, _)| k.as_text() == Some("fmt"))
            .and_then(|(_, v)| v.as_text())
            .ok_or_else(|| CeremonyError::MalformedResponse("missing fmt".into()))?
            .to_string();

        let auth_data = map
            .iter()
            .find(|(k, _)| k.as_text() == Some("authData"))
            .and_then(|(_, v)| v.as_bytes())
            .ok_or_else(|| CeremonyError::MalformedResponse("missing authData".into()))?
            .clone();

        let att_stmt = map
            .iter()
            .find(|(k, _)| k.as_text() == Some("attStmt"))
            .and_then(|(_, v)| v.as_map())
            .ok_or_else(|| CeremonyError::MalformedResponse("missing attStmt".into()))?
            .clone();

        Ok(AttestationObject {
            fmt,
            auth_data,
            att_stmt,
        })
    }

    fn stmt_bytes(&self, key: &str) -> Option<&[u8]> {
        self.att_stmt
            .iter()
            .find(|(k, _)| k.as_text() == Some(key))
            .and_then(|(_, v)| v.as_bytes())
            .map(|b| b.as_slice())
    }

    fn stmt_int(&self, key: &str) -> Option<i64> {
        self.att_stmt
            .iter()
            .find(|(k, _)| k.as_text() == Some(key))
            .and_then(|(_, v)| v.as_integer())
            .and_then(|i| i.try_into().ok())
    }

    fn stmt_has(&self, key: &str) -> bool {
        self.att_stmt.iter().any(|(k, _)| k.as_text() == Some(key))
    }

    /// Verify the attestation statement against the parsed authenticator
    /// data and the client data hash.
    pub fn verify(
        &self,
        auth_data: &AuthenticatorData,
        client_data_hash: &[u8],
    ) -> Result<(), CeremonyError> {
        match self.fmt.as_str() {
            "none" => Ok(()),
            "packed" => self.verify_packed(auth_data, client_data_hash),
            other => Err(CeremonyError::SignatureInvalid(format!(
                "unsupported attestation format: {}",
                other
            ))),
        }
    }

    /// Packed self-attestation: no certificate chain, the signature is made
    /// with the credential private key and verified with the attested COSE
    /// key over authData || clientDataHash.
    fn verify_packed(
        &self,
        auth_data: &AuthenticatorData,
        client_data_hash: &[u8],
    ) -> Result<(), CeremonyError> {
        if self.stmt_has("x5c") {
            return Err(CeremonyError::SignatureInvalid(
                "attestation certificate chains are not supported".into(),
            ));
        }

        let attested = auth_data.attested_credential.as_ref().ok_or_else(|| {
            CeremonyError::MalformedResponse("no attested credential data".into())
        })?;

        let alg = self
            .stmt_int("alg")
            .ok_or_else(|| CeremonyError::MalformedResponse("missing alg in attStmt".into()))?;
        if alg != attested.algorithm {
            return Err(CeremonyError::SignatureInvalid(
                "attestation algorithm does not match credential key".into(),
            ));
        }

        let sig = self
            .stmt_bytes("sig")
            .ok_or_else(|| CeremonyError::MalformedResponse("missing sig in attStmt".into()))?;

        let mut signed_data = self.auth_data.clone();
        signed_data.extend_from_slice(client_data_hash);

        signature::verify_signature(&attested.cose_key, alg, &signed_data, sig)
    }
}
