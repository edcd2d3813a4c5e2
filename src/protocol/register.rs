use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use sha2::{Digest, Sha256};

use crate::config::NONCE_LEN;
use crate::error::Result;
use crate::vault::{secret, KeyVault, SigningKeyHandle};

use super::types::{decode_b64, encode_b64, ClientPublicKeys, RegisterRequest};
use super::{AuthApi, ProtocolError};

pub struct RegistrationInput {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct RegistrationOutcome {
    pub certificate_id: String,
    /// Recovered certificate text, for the user to save locally.
    pub certificate_text: String,
    /// Recovery file (certificate-id / private-key / device-secret lines);
    /// the only moment the private scalar is ever exported.
    pub key_file_text: String,
}

/// Bootstrap a fresh identity: generate the keypair, obtain the encrypted
/// certificate bundle, decrypt it, and enroll key + device secret. Any
/// failing step aborts the whole bootstrap; nothing partial is enrolled.
pub async fn register<A: AuthApi>(
    api: &A,
    vault: &mut KeyVault,
    input: &RegistrationInput,
) -> Result<RegistrationOutcome> {
    let keypair = SigningKeyHandle::generate();

    let response = api
        .register(&RegisterRequest {
            full_name: input.full_name.clone(),
            email: input.email.clone(),
            password: input.password.clone(),
            client_public_keys: ClientPublicKeys {
                signing: encode_b64(&keypair.public_key_sec1),
                post_quantum: None,
            },
        })
        .await?;

    let shared_secret = decode_b64("shared_secret", &response.shared_secret)?;
    let device_secret = decode_b64("device_secret", &response.device_secret)?;

    let certificate_text = decrypt_delivery(
        &shared_secret,
        input.password.as_bytes(),
        &response.certificate_id,
        &response.delivery.ciphertext,
        &response.delivery.nonce,
    )?;

    // Enrollment only after the bundle authenticated.
    vault.store(&response.certificate_id, &keypair.handle)?;
    secret::bind(vault, &response.certificate_id, &device_secret, None)?;
    tracing::info!(certificate_id = %response.certificate_id, "identity enrolled");

    let key_file_text = format!(
        "certificate-id={}\nprivate-key={}\ndevice-secret={}\n",
        response.certificate_id,
        encode_b64(&keypair.private_key_export),
        response.device_secret,
    );

    Ok(RegistrationOutcome {
        certificate_id: response.certificate_id,
        certificate_text,
        key_file_text,
    })
}

/// Delivery key = SHA-256(shared_secret ‖ password ‖ certificate_id); the
/// digest length is exactly the AES-256-GCM key length. Authentication
/// failure reveals nothing about which input was wrong.
pub(crate) fn delivery_key(
    shared_secret: &[u8],
    password: &[u8],
    certificate_id: &str,
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(shared_secret);
    hasher.update(password);
    hasher.update(certificate_id.as_bytes());
    hasher.finalize().into()
}

fn decrypt_delivery(
    shared_secret: &[u8],
    password: &[u8],
    certificate_id: &str,
    ciphertext_b64: &str,
    nonce_b64: &str,
) -> Result<String> {
    let ciphertext = decode_b64("delivery ciphertext", ciphertext_b64)?;
    let nonce = decode_b64("delivery nonce", nonce_b64)?;
    if nonce.len() != NONCE_LEN {
        return Err(ProtocolError::DeliveryDecryptionFailed.into());
    }

    let key = delivery_key(shared_secret, password, certificate_id);
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|_| ProtocolError::DeliveryDecryptionFailed)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
        .map_err(|_| ProtocolError::DeliveryDecryptionFailed)?;

    Ok(String::from_utf8(plaintext).map_err(|_| ProtocolError::DeliveryDecryptionFailed)?)
}
