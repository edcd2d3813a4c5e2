use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::record::IdentityRecord;
use super::VaultError;
use crate::config::NONCE_LEN;

/// Record file name: certificate ids come from user-supplied files, so the
/// path component is a digest, never the id itself.
pub(crate) fn record_path(dir: &Path, certificate_id: &str) -> PathBuf {
    let digest: [u8; 32] = Sha256::digest(certificate_id.as_bytes()).into();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    dir.join(format!("{hex}.bin"))
}

/// Encrypt + write one identity record to `dir/{sha256(id)}.bin`.
pub(crate) fn write_record(
    master_key: &[u8; 32],
    dir: &Path,
    record: &IdentityRecord,
) -> Result<(), VaultError> {
    let mut buf = Vec::new();
    ciborium::into_writer(record, &mut buf)
        .map_err(|e| VaultError::Serialization(e.to_string()))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(master_key)
        .map_err(|e| VaultError::Encryption(e.to_string()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), buf.as_slice())
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    let mut file_bytes = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    file_bytes.extend_from_slice(&nonce_bytes);
    file_bytes.extend_from_slice(&ciphertext);

    std::fs::write(record_path(dir, &record.certificate_id), file_bytes)?;
    Ok(())
}

/// Read + decrypt + deserialize one record file.
pub(crate) fn read_record(
    master_key: &[u8; 32],
    path: &Path,
) -> Result<IdentityRecord, VaultError> {
    let bytes = std::fs::read(path)?;
    if bytes.len() < NONCE_LEN {
        return Err(VaultError::Corrupt("file too short".into()));
    }
    let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new_from_slice(master_key)
        .map_err(|e| VaultError::Encryption(e.to_string()))?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    let record: IdentityRecord = ciborium::from_reader(plaintext.as_slice())
        .map_err(|e| VaultError::Serialization(e.to_string()))?;

    Ok(record)
}

/// Delete the record file for `certificate_id`. Missing file is fine.
pub(crate) fn delete_record(dir: &Path, certificate_id: &str) -> Result<(), VaultError> {
    match std::fs::remove_file(record_path(dir, certificate_id)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Load all valid record files from `dir`. Corrupt or foreign-key files are
/// logged and skipped; they must never crash the caller.
pub(crate) fn load_all(
    master_key: &[u8; 32],
    dir: &Path,
) -> Result<Vec<IdentityRecord>, VaultError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| VaultError::StorageUnavailable(format!("{}: {e}", dir.display())))?;
    let mut records = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("bin") {
            continue;
        }
        match read_record(master_key, &path) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping corrupt identity file");
            }
        }
    }
    Ok(records)
}
