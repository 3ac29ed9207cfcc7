use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{EcdsaKeyPair, Ed25519KeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use ciborium::Value;

use crate::error::CeremonyError;
use crate::webauthn::signature::{client_data_hash, cose_algorithm, verify_signature};

use super::helpers::{eddsa_cose_key, es256_cose_key};

#[test]
fn client_data_hash_is_sha256() {
    // SHA-256("") is a fixed vector
    let hash = client_data_hash(b"");
    assert_eq!(
        hash,
        [
            0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14, 0x9a, 0xfb, 0xf4, 0xc8, 0x99, 0x6f,
            0xb9, 0x24, 0x27, 0xae, 0x41, 0xe4, 0x64, 0x9b, 0x93, 0x4c, 0xa4, 0x95, 0x99, 0x1b,
            0x78, 0x52, 0xb8, 0x55
        ]
    );
}

#[test]
fn eddsa_signature_verifies() {
    let rng = SystemRandom::new();
    let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).unwrap();
    let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap();
    let cose_key = eddsa_cose_key(key_pair.public_key().as_ref());

    let message = b"authenticator data || client data hash";
    let sig = key_pair.sign(message);

    verify_signature(&cose_key, -8, message, sig.as_ref()).unwrap();
}

#[test]
fn corrupted_eddsa_signature_is_rejected() {
    let rng = SystemRandom::new();
    let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).unwrap();
    let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap();
    let cose_key = eddsa_cose_key(key_pair.public_key().as_ref());

    let message = b"authenticator data || client data hash";
    let mut sig = key_pair.sign(message).as_ref().to_vec();
    sig[10] ^= 0x01;

    let err = verify_signature(&cose_key, -8, message, &sig).unwrap_err();
    assert!(matches!(err, CeremonyError::SignatureInvalid(_)));
}

#[test]
fn es256_signature_verifies() {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
    let key_pair =
        EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref()).unwrap();

    // Public key is an uncompressed SEC1 point: 0x04 || x || y
    let point = key_pair.public_key().as_ref();
    assert_eq!(point.len(), 65);
    let cose_key = es256_cose_key(&point[1..33], &point[33..65]);

    let message = b"authenticator data || client data hash";
    let sig = key_pair.sign(&rng, message).unwrap();

    verify_signature(&cose_key, -7, message, sig.as_ref()).unwrap();
}

#[test]
fn es256_rejects_signature_over_different_message() {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
    let key_pair =
        EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref()).unwrap();

    let point = key_pair.public_key().as_ref();
    let cose_key = es256_cose_key(&point[1..33], &point[33..65]);

    let sig = key_pair.sign(&rng, b"one message").unwrap();
    let err = verify_signature(&cose_key, -7, b"another message", sig.as_ref()).unwrap_err();
    assert!(matches!(err, CeremonyError::SignatureInvalid(_)));
}

#[test]
fn unsupported_algorithm_is_rejected() {
    let rng = SystemRandom::new();
    let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).unwrap();
    let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap();
    let cose_key = eddsa_cose_key(key_pair.public_key().as_ref());

    // -35 is ES384, never advertised
    let err = verify_signature(&cose_key, -35, b"message", b"sig").unwrap_err();
    assert!(matches!(err, CeremonyError::SignatureInvalid(_)));
}

#[test]
fn rs256_with_garbage_components_is_rejected() {
    let cose_key = {
        let map = vec![
            (Value::Integer(1.into()), Value::Integer(3.into())), // kty: RSA
            (Value::Integer(3.into()), Value::Integer((-257).into())),
            (Value::Integer((-1).into()), Value::Bytes(vec![0xab; 256])),
            (Value::Integer((-2).into()), Value::Bytes(vec![0x01, 0x00, 0x01])),
        ];
        let mut out = Vec::new();
        ciborium::into_writer(&Value::Map(map), &mut out).unwrap();
        out
    };

    let err = verify_signature(&cose_key, -257, b"message", &[0u8; 256]).unwrap_err();
    assert!(matches!(err, CeremonyError::SignatureInvalid(_)));
}

#[test]
fn rs256_missing_modulus_is_malformed() {
    let cose_key = {
        let map = vec![
            (Value::Integer(1.into()), Value::Integer(3.into())),
            (Value::Integer(3.into()), Value::Integer((-257).into())),
        ];
        let mut out = Vec::new();
        ciborium::into_writer(&Value::Map(map), &mut out).unwrap();
        out
    };

    let err = verify_signature(&cose_key, -257, b"message", b"sig").unwrap_err();
    assert!(matches!(err, CeremonyError::MalformedResponse(_)));
}

#[test]
fn cose_algorithm_reads_label_three() {
    let rng = SystemRandom::new();
    let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).unwrap();
    let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap();

    let alg = cose_algorithm(&eddsa_cose_key(key_pair.public_key().as_ref())).unwrap();
    assert_eq!(alg, -8);
}

#[test]
fn non_map_cose_key_is_malformed() {
    let mut bytes = Vec::new();
    ciborium::into_writer(&Value::Text("not a key".to_string()), &mut bytes).unwrap();

    let err = cose_algorithm(&bytes).unwrap_err();
    assert!(matches!(err, CeremonyError::MalformedResponse(_)));
}
