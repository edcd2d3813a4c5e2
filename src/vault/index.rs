use std::collections::HashMap;
use std::path::PathBuf;

use super::record::{now_secs, IdentityRecord};
use super::{disk, SigningKeyHandle, VaultError};

/// Persistent per-identity key store. At most one record per certificate
/// id; mutations overwrite wholesale, the private key never leaves.
pub struct KeyVault {
    master_key: [u8; 32],
    identities_dir: PathBuf,
    by_id: HashMap<String, IdentityRecord>,
}

/// Metadata view of one identity. No key material.
#[derive(Debug, Clone)]
pub struct IdentitySummary {
    pub certificate_id: String,
    pub public_key_sec1: Vec<u8>,
    pub device_secret_bound: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

impl KeyVault {
    /// Load all identity records from disk into memory.
    pub fn load(master_key: [u8; 32], identities_dir: PathBuf) -> Result<Self, VaultError> {
        let records = disk::load_all(&master_key, &identities_dir)?;
        let mut by_id = HashMap::new();
        for record in records {
            by_id.insert(record.certificate_id.clone(), record);
        }
        Ok(Self {
            master_key,
            identities_dir,
            by_id,
        })
    }

    /// Persist or overwrite the identity's signing key. Re-enrollment
    /// replaces the key and any bound device secret wholesale but keeps
    /// `created_at`.
    pub fn store(&mut self, certificate_id: &str, handle: &SigningKeyHandle) -> Result<(), VaultError> {
        let now = now_secs();
        let created_at = self
            .by_id
            .get(certificate_id)
            .map(|r| r.created_at)
            .unwrap_or(now);
        let record = IdentityRecord {
            version: 1,
            certificate_id: certificate_id.to_string(),
            signing_key: handle.scalar_bytes(),
            public_key: handle.verifying_key_sec1(),
            device_secret: None,
            created_at,
            updated_at: now,
        };
        self.put_record(record)
    }

    /// Metadata for one identity, or `None`. Never fails for a missing record.
    pub fn load_identity(&self, certificate_id: &str) -> Option<IdentitySummary> {
        self.by_id.get(certificate_id).map(|r| IdentitySummary {
            certificate_id: r.certificate_id.clone(),
            public_key_sec1: r.public_key.clone(),
            device_secret_bound: r.device_secret.is_some(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }

    /// The signing key handle, or `KeyMissing` — a recoverable error that
    /// tells the caller to prompt for re-enrollment.
    pub fn ensure(&self, certificate_id: &str) -> Result<SigningKeyHandle, VaultError> {
        let record = self
            .by_id
            .get(certificate_id)
            .ok_or_else(|| VaultError::KeyMissing(certificate_id.to_string()))?;
        SigningKeyHandle::from_private_bytes(&record.signing_key)
    }

    /// Sign `message` with the identity's key (ECDSA P-256 / SHA-256).
    pub fn sign(&self, certificate_id: &str, message: &[u8]) -> Result<[u8; 64], VaultError> {
        Ok(self.ensure(certificate_id)?.sign(message))
    }

    /// Remove one identity; deletes from disk and memory. Idempotent:
    /// returns `false` when nothing was enrolled.
    pub fn remove(&mut self, certificate_id: &str) -> Result<bool, VaultError> {
        let existed = self.by_id.remove(certificate_id).is_some();
        disk::delete_record(&self.identities_dir, certificate_id)?;
        Ok(existed)
    }

    /// All enrolled certificate ids, sorted. Never key material.
    pub fn list_identities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.by_id.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn identity_count(&self) -> usize {
        self.by_id.len()
    }

    pub(crate) fn record(&self, certificate_id: &str) -> Option<&IdentityRecord> {
        self.by_id.get(certificate_id)
    }

    pub(crate) fn put_record(&mut self, record: IdentityRecord) -> Result<(), VaultError> {
        disk::write_record(&self.master_key, &self.identities_dir, &record)?;
        self.by_id.insert(record.certificate_id.clone(), record);
        Ok(())
    }
}
