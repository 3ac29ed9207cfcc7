//! # Registration Ceremony
//!
//! `start_registration` builds the options payload (options generator);
//! `finish_registration` verifies the attestation response and, on success,
//! inserts the new credential. Verification checks run in a fixed order and
//! the ceremony aborts on the first failure with no partial state change.

use crate::db::challenges::{self, CeremonyType, ChallengeError};
use crate::db::{credentials, users};
use crate::error::{AppError, AppResult, CeremonyError};
use crate::state::AppState;
use crate::webauthn::attestation::AttestationObject;
use crate::webauthn::authenticator_data::AuthenticatorData;
use crate::webauthn::client_data::{ClientData, ClientDataType};
use crate::webauthn::signature;
use crate::webauthn::types::*;
use crate::webauthn::{base64_decode, base64_encode};

/// COSE algorithms advertised to clients, in preference order: EdDSA,
/// ES256, RS256.
pub const SUPPORTED_ALGORITHMS: [i64; 3] = [-8, -7, -257];

/// Generate registration options for a username.
///
/// Succeeds for any syntactically valid username, known or not: the user
/// row is created on first sight, and credentials already registered to the
/// username populate the exclusion list so the platform refuses to
/// re-register the same authenticator.
pub async fn start_registration(state: &AppState, username: &str) -> AppResult<RegistrationOptions> {
    let user = users::get_or_create(&state.db, username, username).await?;

    let existing = credentials::find_by_username(&state.db, username).await?;
    let exclude_credentials = existing
        .iter()
        .map(|cred| CredentialDescriptor {
            id: base64_encode(&cred.credential_id),
            type_: "public-key".to_string(),
        })
        .collect();

    let challenge = challenges::issue(
        &state.db,
        username,
        CeremonyType::Registration,
        state.challenge_ttl_secs,
    )
    .await?;

    Ok(RegistrationOptions {
        rp: RpEntity {
            name: state.rp.name.clone(),
            id: state.rp.id.clone(),
        },
        user: UserEntity {
            id: base64_encode(&user.user_handle),
            name: user.username.clone(),
            display_name: user.display_name.clone(),
        },
        challenge: base64_encode(&challenge),
        pub_key_cred_params: SUPPORTED_ALGORITHMS
            .iter()
            .map(|&alg| PubKeyCredParam {
                alg,
                type_: "public-key".to_string(),
            })
            .collect(),
        timeout: state.ceremony_timeout_ms,
        attestation: AttestationConveyancePreference::None,
        authenticator_selection: AuthenticatorSelection {
            resident_key: ResidentKeyRequirement::Preferred,
            user_verification: UserVerificationRequirement::Preferred,
        },
        exclude_credentials,
    })
}

/// Verify an attestation response and store the new credential.
///
/// Ordered rejection points: malformed structure, type marker, challenge
/// consume, origin, RP ID hash, attestation signature, credential id
/// uniqueness. The challenge is spent even when a later step fails.
pub async fn finish_registration(
    state: &AppState,
    username: &str,
    response: &RegistrationResponse,
) -> AppResult<()> {
    if response.type_ != "public-key" {
        return Err(CeremonyError::MalformedResponse(format!(
            "unexpected credential type: {}",
            response.type_
        ))
        .into());
    }

    // 1. Structure
    let (client_data, client_data_bytes) =
        ClientData::from_base64(&response.response.client_data_json)?;

    // 2. Type marker
    client_data.require_type(ClientDataType::Create)?;

    // 3. Challenge, spent on any outcome
    let presented = client_data.challenge_bytes()?;
    consume_challenge(state, username, CeremonyType::Registration, &presented).await?;

    // 4. Origin
    client_data.require_origin(&state.rp.origin)?;

    // 5. RP ID hash
    let attestation_bytes = base64_decode(&response.response.attestation_object)?;
    let attestation = AttestationObject::parse(&attestation_bytes)?;
    let auth_data = AuthenticatorData::parse(&attestation.auth_data)?;
    auth_data.require_rp_id(&state.rp.id)?;

    // 6. Attestation signature
    let hash = signature::client_data_hash(&client_data_bytes);
    attestation.verify(&auth_data, &hash)?;

    let attested = auth_data
        .attested_credential
        .as_ref()
        .ok_or_else(|| CeremonyError::MalformedResponse("no attested credential data".into()))?;

    let credential_id = base64_decode(&response.raw_id)?;
    if credential_id != attested.credential_id {
        return Err(CeremonyError::MalformedResponse(
            "credential id does not match attested credential".into(),
        )
        .into());
    }

    // 7. Global uniqueness
    if credentials::find_by_credential_id(&state.db, &credential_id)
        .await?
        .is_some()
    {
        return Err(CeremonyError::CredentialAlreadyRegistered.into());
    }

    // 8. Persist, with the initial counter reported by the authenticator
    credentials::insert(
        &state.db,
        &credential_id,
        username,
        &attested.cose_key,
        attested.algorithm,
        auth_data.sign_count as i64,
        response.response.transports.as_deref(),
    )
    .await?;

    tracing::info!(
        username,
        credential_id = %base64_encode(&credential_id),
        algorithm = attested.algorithm,
        "credential registered"
    );

    Ok(())
}

/// Map challenge-manager failures into the collapsed client-visible
/// category, keeping database errors distinct.
pub(crate) async fn consume_challenge(
    state: &AppState,
    username: &str,
    ceremony_type: CeremonyType,
    presented: &[u8],
) -> AppResult<()> {
    challenges::consume(&state.db, username, ceremony_type, presented)
        .await
        .map_err(|e| match e {
            ChallengeError::Database(e) => AppError::Database(e),
            reason => {
                tracing::debug!(username, %reason, "challenge rejected");
                AppError::Ceremony(CeremonyError::ChallengeInvalid)
            }
        })
}
