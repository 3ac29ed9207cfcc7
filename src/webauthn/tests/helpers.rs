//! Test fixtures: an in-memory relying-party state and a software
//! authenticator that produces correctly signed registration and
//! authentication responses.

use std::sync::Arc;

use aws_lc_rs::digest::{digest, SHA256};
use aws_lc_rs::rand::{SecureRandom, SystemRandom};
use aws_lc_rs::signature::{Ed25519KeyPair, KeyPair};
use ciborium::Value;
use sqlx::sqlite::SqlitePoolOptions;

use crate::state::{AppState, RelyingParty};
use crate::webauthn::base64_encode;
use crate::webauthn::types::*;

pub const TEST_RP_ID: &str = "localhost";
pub const TEST_ORIGIN: &str = "http://localhost:8080";

/// App state backed by a fresh in-memory database.
pub async fn test_state() -> AppState {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&db).await.unwrap();

    AppState {
        db,
        rp: Arc::new(RelyingParty {
            id: TEST_RP_ID.to_string(),
            origin: TEST_ORIGIN.to_string(),
            name: "Test RP".to_string(),
        }),
        challenge_ttl_secs: 300,
        ceremony_timeout_ms: 60000,
    }
}

/// Raw clientDataJSON bytes echoing a base64url challenge string.
pub fn client_data_json(type_: &str, challenge_b64: &str, origin: &str) -> Vec<u8> {
    let client_data = serde_json::json!({
        "type": type_,
        "challenge": challenge_b64,
        "origin": origin,
        "crossOrigin": false,
    });
    serde_json::to_vec(&client_data).unwrap()
}

/// CBOR attestation object from its three fields.
pub fn attestation_object(fmt: &str, auth_data: &[u8], att_stmt: Vec<(Value, Value)>) -> Vec<u8> {
    let map = vec![
        (
            Value::Text("fmt".to_string()),
            Value::Text(fmt.to_string()),
        ),
        (
            Value::Text("authData".to_string()),
            Value::Bytes(auth_data.to_vec()),
        ),
        (Value::Text("attStmt".to_string()), Value::Map(att_stmt)),
    ];

    let mut out = Vec::new();
    ciborium::into_writer(&Value::Map(map), &mut out).unwrap();
    out
}

/// COSE key for an Ed25519 public key.
pub fn eddsa_cose_key(public_key: &[u8]) -> Vec<u8> {
    let cose_key = vec![
        (Value::Integer(1.into()), Value::Integer(1.into())), // kty: OKP
        (Value::Integer(3.into()), Value::Integer((-8).into())), // alg: EdDSA
        (Value::Integer((-1).into()), Value::Integer(6.into())), // crv: Ed25519
        (
            Value::Integer((-2).into()),
            Value::Bytes(public_key.to_vec()),
        ),
    ];

    let mut out = Vec::new();
    ciborium::into_writer(&Value::Map(cose_key), &mut out).unwrap();
    out
}

/// COSE key for a P-256 public key given its coordinates.
pub fn es256_cose_key(x: &[u8], y: &[u8]) -> Vec<u8> {
    let cose_key = vec![
        (Value::Integer(1.into()), Value::Integer(2.into())), // kty: EC2
        (Value::Integer(3.into()), Value::Integer((-7).into())), // alg: ES256
        (Value::Integer((-1).into()), Value::Integer(1.into())), // crv: P-256
        (Value::Integer((-2).into()), Value::Bytes(x.to_vec())),
        (Value::Integer((-3).into()), Value::Bytes(y.to_vec())),
    ];

    let mut out = Vec::new();
    ciborium::into_writer(&Value::Map(cose_key), &mut out).unwrap();
    out
}

/// A software Ed25519 authenticator with a fixed credential id.
pub struct SoftAuthenticator {
    key_pair: Ed25519KeyPair,
    pub credential_id: Vec<u8>,
}

impl SoftAuthenticator {
    pub fn new() -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).unwrap();
        let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap();

        let mut credential_id = vec![0u8; 16];
        rng.fill(&mut credential_id).unwrap();

        Self {
            key_pair,
            credential_id,
        }
    }

    pub fn cose_key(&self) -> Vec<u8> {
        eddsa_cose_key(self.key_pair.public_key().as_ref())
    }

    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        self.key_pair.sign(data).as_ref().to_vec()
    }

    /// Authenticator data with attested credential data, as produced at
    /// registration.
    pub fn attestation_auth_data(&self, rp_id: &str, counter: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(digest(&SHA256, rp_id.as_bytes()).as_ref());
        out.push(0x45); // UP | UV | AT
        out.extend_from_slice(&counter.to_be_bytes());
        out.extend_from_slice(&[0u8; 16]); // aaguid
        out.extend_from_slice(&(self.credential_id.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.credential_id);
        out.extend_from_slice(&self.cose_key());
        out
    }

    /// Well-formed registration response with "none" attestation.
    pub fn registration_response(
        &self,
        options: &RegistrationOptions,
        origin: &str,
        counter: u32,
    ) -> RegistrationResponse {
        self.registration_response_custom(
            &options.challenge,
            origin,
            "webauthn.create",
            &options.rp.id,
            counter,
        )
    }

    /// Registration response with every ceremony-relevant field under test
    /// control.
    pub fn registration_response_custom(
        &self,
        challenge_b64: &str,
        origin: &str,
        type_: &str,
        rp_id: &str,
        counter: u32,
    ) -> RegistrationResponse {
        let client_data = client_data_json(type_, challenge_b64, origin);
        let auth_data = self.attestation_auth_data(rp_id, counter);
        let att_obj = attestation_object("none", &auth_data, Vec::new());

        RegistrationResponse {
            id: base64_encode(&self.credential_id),
            raw_id: base64_encode(&self.credential_id),
            type_: "public-key".to_string(),
            response: AttestationResponse {
                client_data_json: base64_encode(&client_data),
                attestation_object: base64_encode(&att_obj),
                transports: Some(vec!["internal".to_string()]),
            },
        }
    }

    /// Registration response carrying a packed self-attestation statement.
    pub fn packed_registration_response(
        &self,
        options: &RegistrationOptions,
        origin: &str,
        counter: u32,
    ) -> RegistrationResponse {
        let client_data = client_data_json("webauthn.create", &options.challenge, origin);
        let auth_data = self.attestation_auth_data(&options.rp.id, counter);

        let mut signed = auth_data.clone();
        signed.extend_from_slice(digest(&SHA256, &client_data).as_ref());
        let sig = self.sign(&signed);

        let att_stmt = vec![
            (Value::Text("alg".to_string()), Value::Integer((-8).into())),
            (Value::Text("sig".to_string()), Value::Bytes(sig)),
        ];
        let att_obj = attestation_object("packed", &auth_data, att_stmt);

        RegistrationResponse {
            id: base64_encode(&self.credential_id),
            raw_id: base64_encode(&self.credential_id),
            type_: "public-key".to_string(),
            response: AttestationResponse {
                client_data_json: base64_encode(&client_data),
                attestation_object: base64_encode(&att_obj),
                transports: None,
            },
        }
    }

    /// Well-formed assertion response.
    pub fn assertion_response(
        &self,
        options: &AuthenticationOptions,
        origin: &str,
        counter: u32,
    ) -> AuthenticationResponse {
        self.assertion_response_custom(&options.challenge, origin, "webauthn.get", &options.rp_id, counter)
    }

    /// Assertion response with every ceremony-relevant field under test
    /// control.
    pub fn assertion_response_custom(
        &self,
        challenge_b64: &str,
        origin: &str,
        type_: &str,
        rp_id: &str,
        counter: u32,
    ) -> AuthenticationResponse {
        let client_data = client_data_json(type_, challenge_b64, origin);

        let mut auth_data = Vec::new();
        auth_data.extend_from_slice(digest(&SHA256, rp_id.as_bytes()).as_ref());
        auth_data.push(0x01); // UP
        auth_data.extend_from_slice(&counter.to_be_bytes());

        let mut signed = auth_data.clone();
        signed.extend_from_slice(digest(&SHA256, &client_data).as_ref());
        let sig = self.sign(&signed);

        AuthenticationResponse {
            id: base64_encode(&self.credential_id),
            raw_id: base64_encode(&self.credential_id),
            type_: "public-key".to_string(),
            response: AssertionResponse {
                client_data_json: base64_encode(&client_data),
                authenticator_data: base64_encode(&auth_data),
                signature: base64_encode(&sig),
                user_handle: None,
            },
        }
    }
}
