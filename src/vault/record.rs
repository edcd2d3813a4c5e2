use serde::{Deserialize, Serialize};

/// On-disk form of one enrolled identity. The whole record is encrypted
/// under the vault master key before it touches disk; the signing key
/// scalar exists in plaintext only inside the vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct IdentityRecord {
    pub version: u8,
    pub certificate_id: String,
    pub signing_key: Vec<u8>, // P-256 private scalar, 32 bytes
    pub public_key: Vec<u8>,  // SEC1 uncompressed point
    pub device_secret: Option<BoundSecret>,
    pub created_at: u64, // Unix timestamp
    pub updated_at: u64,
}

/// Ciphertext, nonce, and per-identity key travel together or not at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct BoundSecret {
    pub key: Vec<u8>, // AES-256-GCM key, used solely for this record's secret
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

pub(crate) fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
