//! # Wire Types
//!
//! The protocol boundary: options payloads sent to clients and the signed
//! responses they post back. Responses are decoded into tagged structs at
//! this boundary; the verifiers never inspect loose JSON.

use serde::{Deserialize, Serialize};

// Options payloads (server -> client)

/// Relying-party identity as it appears in registration options.
#[derive(Serialize, Debug)]
pub struct RpEntity {
    pub name: String,
    pub id: String,
}

/// User identity in registration options. The id is the base64url-encoded
/// stable user handle, not the username.
#[derive(Serialize, Debug)]
pub struct UserEntity {
    pub id: String,
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Acceptable public-key algorithm (COSE identifier).
#[derive(Serialize, Debug)]
pub struct PubKeyCredParam {
    pub alg: i64,
    #[serde(rename = "type")]
    pub type_: String,
}

/// Credential descriptor used in both exclusion lists (registration) and
/// allow-lists (authentication).
#[derive(Serialize, Debug)]
pub struct CredentialDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
}

/// Attestation conveyance preference requested from the client.
#[derive(Serialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum AttestationConveyancePreference {
    None,
    Indirect,
    Direct,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ResidentKeyRequirement {
    Discouraged,
    Preferred,
    Required,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum UserVerificationRequirement {
    Required,
    Preferred,
    Discouraged,
}

#[derive(Serialize, Debug)]
pub struct AuthenticatorSelection {
    #[serde(rename = "residentKey")]
    pub resident_key: ResidentKeyRequirement,
    #[serde(rename = "userVerification")]
    pub user_verification: UserVerificationRequirement,
}

/// Options payload for `navigator.credentials.create()` /
/// `CreatePublicKeyCredentialRequest`.
#[derive(Serialize, Debug)]
pub struct RegistrationOptions {
    pub rp: RpEntity,
    pub user: UserEntity,
    /// base64url-encoded challenge.
    pub challenge: String,
    #[serde(rename = "pubKeyCredParams")]
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    pub timeout: u64,
    pub attestation: AttestationConveyancePreference,
    #[serde(rename = "authenticatorSelection")]
    pub authenticator_selection: AuthenticatorSelection,
    /// Credentials the client must refuse to re-register.
    #[serde(rename = "excludeCredentials")]
    pub exclude_credentials: Vec<CredentialDescriptor>,
}

/// Options payload for `navigator.credentials.get()` /
/// `GetCredentialRequest`. An empty allow-list means "any registered
/// authenticator for this RP" (discoverable-credential flow).
#[derive(Serialize, Debug)]
pub struct AuthenticationOptions {
    /// base64url-encoded challenge.
    pub challenge: String,
    pub timeout: u64,
    #[serde(rename = "rpId")]
    pub rp_id: String,
    #[serde(rename = "allowCredentials")]
    pub allow_credentials: Vec<CredentialDescriptor>,
    #[serde(rename = "userVerification")]
    pub user_verification: UserVerificationRequirement,
}

// Client responses (client -> server)

/// Body of `POST /verify-registration`.
#[derive(Deserialize, Debug)]
pub struct VerifyRegistrationRequest {
    /// The username the ceremony was started for; keys the challenge
    /// lookup.
    pub username: String,
    pub response: RegistrationResponse,
}

/// The attestation credential produced by the platform credential manager.
#[derive(Deserialize, Debug)]
pub struct RegistrationResponse {
    pub id: String,
    #[serde(rename = "rawId")]
    pub raw_id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub response: AttestationResponse,
}

#[derive(Deserialize, Debug)]
pub struct AttestationResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    #[serde(rename = "attestationObject")]
    pub attestation_object: String,
    /// Transport hints reported by the authenticator, stored as opaque
    /// metadata.
    #[serde(default)]
    pub transports: Option<Vec<String>>,
}

/// Body of `POST /verify-authentication`.
#[derive(Deserialize, Debug)]
pub struct VerifyAuthenticationRequest {
    pub username: String,
    pub response: AuthenticationResponse,
}

/// The assertion produced by the platform credential manager.
#[derive(Deserialize, Debug)]
pub struct AuthenticationResponse {
    pub id: String,
    #[serde(rename = "rawId")]
    pub raw_id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub response: AssertionResponse,
}

#[derive(Deserialize, Debug)]
pub struct AssertionResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    #[serde(rename = "authenticatorData")]
    pub authenticator_data: String,
    pub signature: String,
    #[serde(rename = "userHandle", default)]
    pub user_handle: Option<String>,
}
