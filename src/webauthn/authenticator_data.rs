//! # Authenticator Data
//!
//! Parser for the binary authenticator data blob present in both
//! attestation objects and assertion responses:
//!
//! ```text
//! rpIdHash (32) | flags (1) | signCount (4, BE) | [attested credential data]
//! attested credential data = aaguid (16) | credIdLen (2, BE) | credId | COSE key
//! ```

use aws_lc_rs::digest::{digest, SHA256};

use crate::error::CeremonyError;
use crate::webauthn::signature;

/// User-present flag.
pub const FLAG_UP: u8 = 0x01;
/// User-verified flag.
pub const FLAG_UV: u8 = 0x04;
/// Attested-credential-data-present flag.
pub const FLAG_AT: u8 = 0x40;

/// Parsed authenticator data.
#[derive(Debug)]
pub struct AuthenticatorData {
    /// SHA-256 of the RP ID the authenticator scoped the operation to.
    pub rp_id_hash: [u8; 32],

    pub flags: u8,

    /// The authenticator's signature counter; 0 means the authenticator
    /// does not implement one.
    pub sign_count: u32,

    /// Present when FLAG_AT is set (registration responses).
    pub attested_credential: Option<AttestedCredential>,
}

/// The credential material attested at registration time.
#[derive(Debug)]
pub struct AttestedCredential {
    pub aaguid: [u8; 16],

    pub credential_id: Vec<u8>,

    /// Raw CBOR COSE key bytes, stored verbatim in the credential store.
    pub cose_key: Vec<u8>,

    /// COSE algorithm identifier extracted from the key.
    pub algorithm: i64,
}

impl AuthenticatorData {
    pub fn parse(bytes: &[u8]) -> Result<AuthenticatorData, CeremonyError> {
        if bytes.len() < 37 {
            return Err(CeremonyError::MalformedResponse(
                "authenticator data too short".into(),
            ));
        }

        let mut rp_id_hash = [0u8; 32];
        rp_id_hash.copy_from_slice(&bytes[0..32]);

        let flags = bytes[32];
        let sign_count = u32::from_be_bytes([bytes[33], bytes[34], bytes[35], bytes[36]]);

        let attested_credential = if flags & FLAG_AT != 0 {
            Some(Self::parse_attested_credential(&bytes[37..])?)
        } else {
            None
        };

        Ok(AuthenticatorData {
            rp_id_hash,
            flags,
            sign_count,
            attested_credential,
        })
    }

    fn parse_attested_credential(bytes: &[u8]) -> Result<AttestedCredential, CeremonyError> {
        // aaguid (16) + credIdLen (2)
        if bytes.len() < 18 {
            return Err(CeremonyError::MalformedResponse(
                "attested credential data too short".into(),
            ));
        }

        let mut aaguid = [0u8; 16];
        aaguid.copy_from_slice(&bytes[0..16]);

        let cred_id_len = u16::from_be_bytes([bytes[16], bytes[17]]) as usize;
        let cose_key_offset = 18 + cred_id_len;
        if bytes.len() <= cose_key_offset {
            return Err(CeremonyError::MalformedResponse(
                "attested credential data truncated".into(),
            ));
        }

        let credential_id = bytes[18..cose_key_offset].to_vec();

        // The COSE key occupies the remainder of the blob; extensions are
        // not supported and would be rejected by the CBOR parse below.
        let cose_key = bytes[cose_key_offset..].to_vec();
        let algorithm = signature::cose_algorithm(&cose_key)?;

        Ok(AttestedCredential {
            aaguid,
            credential_id,
            cose_key,
            algorithm,
        })
    }

    /// Check the embedded RP ID hash against the configured RP ID.
    pub fn require_rp_id(&self, rp_id: &str) -> Result<(), CeremonyError> {
        let expected = digest(&SHA256, rp_id.as_bytes());
        if expected.as_ref() != self.rp_id_hash.as_slice() {
            return Err(CeremonyError::RpIdMismatch);
        }
        Ok(())
    }
}
