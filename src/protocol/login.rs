use crate::certificate::{CertificateError, CertificatePayload};
use crate::config::BINDING_MODE;
use crate::device;
use crate::error::{Error, Result};
use crate::vault::{secret, KeyVault, SigningKeyHandle, VaultError};

use super::types::{decode_b64, encode_b64, ChallengeRequest, LoginRequest, UserRecord};
use super::{AuthApi, ProtocolError};

/// Protocol states of one login run. Transitions are strictly sequential;
/// there is no pipelining and no retry inside a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    ChallengeRequested,
    ProofAssembled,
    Submitted,
    Authenticated,
    Rejected,
}

pub struct LoginInput<'a> {
    pub certificate_text: &'a str,
    pub certificate_filename: Option<&'a str>,
    /// Private-key recovery file. Supplying it re-enrolls this profile
    /// before the challenge round-trip.
    pub key_file_text: Option<&'a str>,
}

#[derive(Debug)]
pub struct LoginOutcome {
    pub certificate_id: String,
    pub token: String,
    pub user: UserRecord,
}

/// Run one challenge-response login. Callers serialize attempts per
/// identity; a run that fails retains no partial state.
pub async fn login<A: AuthApi>(
    api: &A,
    vault: &mut KeyVault,
    input: LoginInput<'_>,
) -> Result<LoginOutcome> {
    let mut state = LoginState::Idle;
    tracing::debug!(?state, "login run started");

    let payload = CertificatePayload::parse(input.certificate_text);
    let certificate_id = payload
        .resolve_certificate_id(input.certificate_filename)
        .ok_or_else(|| {
            CertificateError::Malformed(
                "no certificate identifier in file or filename".to_string(),
            )
        })?;

    if let Some(key_file_text) = input.key_file_text {
        re_enroll(vault, &certificate_id, key_file_text)?;
        tracing::info!(certificate_id = %certificate_id, "re-enrolled key material from recovery file");
    }

    // The signing key and device secret must both be available before any
    // network traffic; a missing one is the re-enrollment prompt.
    vault.ensure(&certificate_id)?;
    let device_secret = secret::reveal(vault, &certificate_id).ok_or_else(|| {
        VaultError::KeyMissing(format!("{certificate_id} (device secret unbound)"))
    })?;

    let embedded = payload.device_id();
    let derived = device::derive(&device_secret);
    let challenge_device_id = embedded.unwrap_or(&derived).to_string();

    let challenge = api
        .request_challenge(&ChallengeRequest {
            certificate_id: certificate_id.clone(),
            device_id: challenge_device_id,
        })
        .await?;
    state = LoginState::ChallengeRequested;
    tracing::debug!(?state, token = %challenge.challenge_token, "challenge received");

    if challenge.binding_mode != BINDING_MODE {
        return Err(ProtocolError::UnsupportedBindingMode(challenge.binding_mode).into());
    }

    // Binding check happens after challenge retrieval and before signing:
    // a certificate issued for another device must never reach the vault.
    let device_id = device::reconcile(embedded, &derived)?;

    let nonce = challenge.nonce_bytes()?;
    // Protocol contract: raw concatenation, nonce first, no delimiter.
    let mut message = Vec::with_capacity(nonce.len() + device_id.len());
    message.extend_from_slice(&nonce);
    message.extend_from_slice(device_id.as_bytes());

    let signature = vault.sign(&certificate_id, &message)?;
    let device_proof = device::proof(&device_secret, &nonce);
    state = LoginState::ProofAssembled;
    tracing::debug!(?state, "proof assembled");

    let request = LoginRequest {
        challenge_token: challenge.challenge_token,
        device_id,
        device_proof,
        signature: encode_b64(&signature),
        pq_signature: None, // slot carried, path unintegrated
    };
    state = LoginState::Submitted;
    tracing::debug!(?state, "submitting assertion");

    let response = match api.submit_login(&request).await {
        Ok(response) => response,
        Err(e) => {
            state = LoginState::Rejected;
            tracing::info!(?state, error = %e, "login rejected");
            return Err(e.into());
        }
    };
    state = LoginState::Authenticated;
    tracing::info!(?state, certificate_id = %certificate_id, "login accepted");

    Ok(LoginOutcome {
        certificate_id,
        token: response.token,
        user: response.user,
    })
}

/// Import a private-key recovery file: enroll the key, then re-bind the
/// device secret under it. Lets a user recover access on a fresh profile.
fn re_enroll(vault: &mut KeyVault, certificate_id: &str, key_file_text: &str) -> Result<()> {
    let payload = CertificatePayload::parse(key_file_text);

    if let Some(id) = payload.certificate_id() {
        if id != certificate_id {
            return Err(CertificateError::Malformed(format!(
                "key file belongs to certificate '{id}', not '{certificate_id}'"
            ))
            .into());
        }
    }

    let private_key = payload
        .get("private-key")
        .ok_or_else(|| CertificateError::Malformed("key file missing private-key".into()))?;
    let device_secret = payload
        .get("device-secret")
        .ok_or_else(|| CertificateError::Malformed("key file missing device-secret".into()))?;

    let scalar = decode_b64("private-key", private_key)
        .map_err(|_| CertificateError::Malformed("private-key is not valid base64".into()))?;
    let secret_bytes = decode_b64("device-secret", device_secret)
        .map_err(|_| CertificateError::Malformed("device-secret is not valid base64".into()))?;

    let handle = SigningKeyHandle::from_private_bytes(&scalar)
        .map_err(|_| Error::Certificate(CertificateError::Malformed(
            "private-key is not a valid P-256 scalar".into(),
        )))?;

    vault.store(certificate_id, &handle)?;
    secret::bind(vault, certificate_id, &secret_bytes, None)?;
    Ok(())
}
