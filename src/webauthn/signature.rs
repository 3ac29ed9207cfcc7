//! # COSE Key Signature Verification
//!
//! Verifies ceremony signatures against stored (or freshly attested) COSE
//! public keys. Supported algorithms mirror what the options payloads
//! advertise: EdDSA (-8), ES256 (-7), RS256 (-257).

use aws_lc_rs::digest::{digest, SHA256};
use aws_lc_rs::signature::{
    RsaPublicKeyComponents, UnparsedPublicKey, ECDSA_P256_SHA256_ASN1, ED25519,
    RSA_PKCS1_2048_8192_SHA256,
};
use ciborium::Value;

use crate::error::CeremonyError;

/// SHA-256 of the raw clientDataJSON bytes; the authenticator signs over
/// authenticatorData concatenated with this hash.
pub fn client_data_hash(client_data_bytes: &[u8]) -> Vec<u8> {
    digest(&SHA256, client_data_bytes).as_ref().to_vec()
}

fn cose_map(cose_key: &[u8]) -> Result<Vec<(Value, Value)>, CeremonyError> {
    let value: Value = ciborium::from_reader(cose_key)
        .map_err(|e| CeremonyError::MalformedResponse(format!("invalid COSE key: {}", e)))?;

    match value {
        Value::Map(map) => Ok(map),
        _ => Err(CeremonyError::MalformedResponse(
            "COSE key is not a map".into(),
        )),
    }
}

fn cose_int(map: &[(Value, Value)], label: i64) -> Option<i64> {
    map.iter()
        .find(|(k, _)| k.as_integer() == Some(label.into()))
        .and_then(|(_, v)| v.as_integer())
        .and_then(|i| i.try_into().ok())
}

fn cose_bytes<'a>(map: &'a [(Value, Value)], label: i64) -> Option<&'a [u8]> {
    map.iter()
        .find(|(k, _)| k.as_integer() == Some(label.into()))
        .and_then(|(_, v)| v.as_bytes())
        .map(|b| b.as_slice())
}

/// Extract the COSE algorithm identifier (label 3) from a COSE key.
pub fn cose_algorithm(cose_key: &[u8]) -> Result<i64, CeremonyError> {
    let map = cose_map(cose_key)?;
    cose_int(&map, 3)
        .ok_or_else(|| CeremonyError::MalformedResponse("missing algorithm in COSE key".into()))
}

/// Verify `signature` over `signed_data` with the given COSE key.
pub fn verify_signature(
    cose_key: &[u8],
    algorithm: i64,
    signed_data: &[u8],
    signature: &[u8],
) -> Result<(), CeremonyError> {
    match algorithm {
        -8 => verify_eddsa(cose_key, signed_data, signature),
        -7 => verify_es256(cose_key, signed_data, signature),
        -257 => verify_rs256(cose_key, signed_data, signature),
        other => Err(CeremonyError::SignatureInvalid(format!(
            "unsupported algorithm: {}",
            other
        ))),
    }
}

/// EdDSA (Ed25519). The COSE key carries the 32-byte public key as the x
/// coordinate (label -2).
fn verify_eddsa(cose_key: &[u8], signed_data: &[u8], signature: &[u8]) -> Result<(), CeremonyError> {
    let map = cose_map(cose_key)?;
    let x = cose_bytes(&map, -2).ok_or_else(|| {
        CeremonyError::MalformedResponse("missing x coordinate in COSE key".into())
    })?;

    if x.len() != 32 {
        return Err(CeremonyError::SignatureInvalid(
            "invalid Ed25519 public key length".into(),
        ));
    }

    UnparsedPublicKey::new(&ED25519, x)
        .verify(signed_data, signature)
        .map_err(|_| CeremonyError::SignatureInvalid("EdDSA verification failed".into()))
}

/// ES256 (ECDSA P-256 with SHA-256, ASN.1 signature encoding). The COSE key
/// carries x and y coordinates (labels -2, -3).
fn verify_es256(cose_key: &[u8], signed_data: &[u8], signature: &[u8]) -> Result<(), CeremonyError> {
    let map = cose_map(cose_key)?;
    let x = cose_bytes(&map, -2).ok_or_else(|| {
        CeremonyError::MalformedResponse("missing x coordinate in COSE key".into())
    })?;
    let y = cose_bytes(&map, -3).ok_or_else(|| {
        CeremonyError::MalformedResponse("missing y coordinate in COSE key".into())
    })?;

    // Uncompressed SEC1 point: 0x04 || x || y
    let mut public_key = Vec::with_capacity(1 + x.len() + y.len());
    public_key.push(0x04);
    public_key.extend_from_slice(x);
    public_key.extend_from_slice(y);

    UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, &public_key)
        .verify(signed_data, signature)
        .map_err(|_| CeremonyError::SignatureInvalid("ES256 verification failed".into()))
}

/// RS256 (RSASSA-PKCS1-v1_5 with SHA-256). The COSE key carries the modulus
/// and exponent (labels -1, -2).
fn verify_rs256(cose_key: &[u8], signed_data: &[u8], signature: &[u8]) -> Result<(), CeremonyError> {
    let map = cose_map(cose_key)?;
    let n = cose_bytes(&map, -1)
        .ok_or_else(|| CeremonyError::MalformedResponse("missing modulus in COSE key".into()))?;
    let e = cose_bytes(&map, -2)
        .ok_or_else(|| CeremonyError::MalformedResponse("missing exponent in COSE key".into()))?;

    RsaPublicKeyComponents { n, e }
        .verify(&RSA_PKCS1_2048_8192_SHA256, signed_data, signature)
        .map_err(|_| CeremonyError::SignatureInvalid("RS256 verification failed".into()))
}
