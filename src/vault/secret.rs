//! Device Secret Vault: envelope-encrypted storage of the device-binding
//! secret, layered on the Key Vault's record storage. The per-identity
//! symmetric key is generated on first bind and reused on rebind; only
//! ciphertext crosses the serialization boundary (the record file is
//! additionally encrypted under the vault master key).

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use rand::RngCore;

use super::record::{now_secs, BoundSecret};
use super::{KeyVault, VaultError};
use crate::config::{KEY_LEN, NONCE_LEN};

/// Encrypt `secret` under the identity's symmetric key with a fresh random
/// nonce and persist ciphertext + nonce + key into the record. Passing
/// `existing_key` rotates the key explicitly.
pub fn bind(
    vault: &mut KeyVault,
    certificate_id: &str,
    secret: &[u8],
    existing_key: Option<[u8; KEY_LEN]>,
) -> Result<(), VaultError> {
    let mut record = vault
        .record(certificate_id)
        .cloned()
        .ok_or_else(|| VaultError::KeyMissing(certificate_id.to_string()))?;

    let key_bytes = match existing_key {
        Some(key) => key.to_vec(),
        None => match &record.device_secret {
            Some(bound) => bound.key.clone(),
            None => {
                let mut key = [0u8; KEY_LEN];
                rand::thread_rng().fill_bytes(&mut key);
                key.to_vec()
            }
        },
    };

    let cipher = Aes256Gcm::new_from_slice(&key_bytes)
        .map_err(|e| VaultError::Encryption(e.to_string()))?;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), secret)
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    record.device_secret = Some(BoundSecret {
        key: key_bytes,
        iv: nonce_bytes.to_vec(),
        ciphertext,
    });
    record.updated_at = now_secs();
    vault.put_record(record)
}

/// Decrypt and return the device secret, or `None` when unbound or when
/// authentication fails — a corrupted or foreign record is "not available",
/// never a hard error.
pub fn reveal(vault: &KeyVault, certificate_id: &str) -> Option<Vec<u8>> {
    let bound = vault.record(certificate_id)?.device_secret.as_ref()?;
    if bound.iv.len() != NONCE_LEN {
        tracing::warn!(certificate_id, "device secret nonce has wrong length; treating as unbound");
        return None;
    }
    let cipher = Aes256Gcm::new_from_slice(&bound.key).ok()?;
    match cipher.decrypt(Nonce::from_slice(&bound.iv), bound.ciphertext.as_slice()) {
        Ok(secret) => Some(secret),
        Err(_) => {
            tracing::warn!(certificate_id, "device secret failed authentication; treating as unbound");
            None
        }
    }
}
