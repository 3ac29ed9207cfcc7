//! # Authentication Ceremony
//!
//! `start_authentication` builds the options payload; `finish_authentication`
//! verifies the assertion against the stored credential and advances the
//! sign counter. The allow-list is deliberately empty for unknown usernames
//! so the endpoint emits no enumeration signal.

use crate::db::challenges::{self, CeremonyType};
use crate::db::credentials;
use crate::error::{AppResult, CeremonyError};
use crate::state::AppState;
use crate::webauthn::authenticator_data::AuthenticatorData;
use crate::webauthn::client_data::{ClientData, ClientDataType};
use crate::webauthn::registration::consume_challenge;
use crate::webauthn::signature;
use crate::webauthn::types::*;
use crate::webauthn::{base64_decode, base64_encode};

/// Generate authentication options for a username.
///
/// Unknown usernames are not an error: the payload simply carries an empty
/// allow-list, indistinguishable from a discoverable-credential flow, and
/// no user row is created.
pub async fn start_authentication(
    state: &AppState,
    username: &str,
) -> AppResult<AuthenticationOptions> {
    let registered = credentials::find_by_username(&state.db, username).await?;
    let allow_credentials = registered
        .iter()
        .map(|cred| CredentialDescriptor {
            id: base64_encode(&cred.credential_id),
            type_: "public-key".to_string(),
        })
        .collect();

    let challenge = challenges::issue(
        &state.db,
        username,
        CeremonyType::Authentication,
        state.challenge_ttl_secs,
    )
    .await?;

    Ok(AuthenticationOptions {
        challenge: base64_encode(&challenge),
        timeout: state.ceremony_timeout_ms,
        rp_id: state.rp.id.clone(),
        allow_credentials,
        user_verification: UserVerificationRequirement::Preferred,
    })
}

/// Verify an assertion response. On success the stored sign counter is
/// advanced to the presented value and the username is returned for
/// session issuance.
pub async fn finish_authentication(
    state: &AppState,
    username: &str,
    response: &AuthenticationResponse,
) -> AppResult<String> {
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
    client_data.require_type(ClientDataType::Get)?;

    // 3. Challenge, spent on any outcome
    let presented = client_data.challenge_bytes()?;
    consume_challenge(state, username, CeremonyType::Authentication, &presented).await?;

    // 4. Origin
    client_data.require_origin(&state.rp.origin)?;

    // 5. RP ID hash
    let auth_data_bytes = base64_decode(&response.response.authenticator_data)?;
    let auth_data = AuthenticatorData::parse(&auth_data_bytes)?;
    auth_data.require_rp_id(&state.rp.id)?;

    // 6. Credential lookup and ownership
    let credential_id = base64_decode(&response.raw_id)?;
    let record = credentials::find_by_credential_id(&state.db, &credential_id)
        .await?
        .ok_or(CeremonyError::UnknownCredential)?;
    if record.username != username {
        return Err(CeremonyError::UsernameMismatch.into());
    }

    // 7. Assertion signature over authenticatorData || clientDataHash
    let sig = base64_decode(&response.response.signature)?;
    let mut signed_data = auth_data_bytes.clone();
    signed_data.extend_from_slice(&signature::client_data_hash(&client_data_bytes));
    signature::verify_signature(&record.public_key, record.algorithm, &signed_data, &sig)?;

    // 8. Counter monotonicity. A stored counter of 0 means the
    // authenticator never reported one, so the check is skipped.
    let presented_counter = i64::from(auth_data.sign_count);
    if record.sign_counter != 0 && presented_counter <= record.sign_counter {
        tracing::warn!(
            username,
            credential_id = %base64_encode(&credential_id),
            stored = record.sign_counter,
            presented = presented_counter,
            "sign counter did not advance; possible cloned authenticator"
        );
        return Err(CeremonyError::CounterReplaySuspected.into());
    }

    // 9. Persist the accepted counter
    credentials::update_sign_counter(&state.db, &credential_id, presented_counter).await?;

    tracing::info!(
        username,
        credential_id = %base64_encode(&credential_id),
        "authentication verified"
    );

    Ok(username.to_string())
}
