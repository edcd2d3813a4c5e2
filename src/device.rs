use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("device binding mismatch: certificate was issued for device {embedded}, this device derives to {derived}")]
    BindingMismatch { embedded: String, derived: String },
}

/// Stable device identifier derived from the device secret. Used only when
/// the certificate does not already embed a device id.
pub fn derive(device_secret: &[u8]) -> String {
    let digest: [u8; 32] = Sha256::digest(device_secret).into();
    hex(&digest)
}

/// Fail closed when the certificate's embedded device id and the id derived
/// from the presented secret disagree: the certificate belongs to another
/// device. Never falls back to trusting one side silently.
pub fn reconcile(embedded: Option<&str>, derived: &str) -> Result<String, DeviceError> {
    match embedded {
        Some(embedded) if embedded != derived => Err(DeviceError::BindingMismatch {
            embedded: embedded.to_string(),
            derived: derived.to_string(),
        }),
        Some(embedded) => Ok(embedded.to_string()),
        None => Ok(derived.to_string()),
    }
}

/// Proof of possession of the device secret for one challenge nonce,
/// independent of the asymmetric signature.
pub fn proof(device_secret: &[u8], nonce: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(device_secret);
    hasher.update(nonce);
    let digest: [u8; 32] = hasher.finalize().into();
    hex(&digest)
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
