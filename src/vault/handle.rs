use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;

use super::VaultError;

/// Capability object for one enrolled private key. Signing and public-key
/// export are the only operations; the private scalar has no accessor
/// outside the vault and the type implements no serialization.
pub struct SigningKeyHandle {
    key: SigningKey,
}

impl std::fmt::Debug for SigningKeyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKeyHandle(..)")
    }
}

/// Result of registration-time key generation. `private_key_export` exists
/// exactly once, here, so the user can save a recovery file; the handle
/// never re-exposes it.
pub struct GeneratedKeypair {
    pub handle: SigningKeyHandle,
    pub public_key_sec1: Vec<u8>,
    pub private_key_export: Vec<u8>,
}

impl SigningKeyHandle {
    pub fn generate() -> GeneratedKeypair {
        let key = SigningKey::random(&mut rand::thread_rng());
        let public_key_sec1 = key.verifying_key().to_encoded_point(false).as_bytes().to_vec();
        let private_key_export = key.to_bytes().to_vec();
        GeneratedKeypair {
            handle: Self { key },
            public_key_sec1,
            private_key_export,
        }
    }

    /// Import a private scalar from a user-held recovery file.
    pub fn from_private_bytes(bytes: &[u8]) -> Result<Self, VaultError> {
        let key = SigningKey::from_slice(bytes)
            .map_err(|_| VaultError::Corrupt("invalid private key material".into()))?;
        Ok(Self { key })
    }

    /// ECDSA P-256 over SHA-256. Raw `r ‖ s`, each component 32 bytes.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let signature: Signature = self.key.sign(message);
        let mut out = [0u8; 64];
        out.copy_from_slice(signature.to_bytes().as_slice());
        out
    }

    pub fn verifying_key_sec1(&self) -> Vec<u8> {
        self.key.verifying_key().to_encoded_point(false).as_bytes().to_vec()
    }

    /// Leaves the handle only toward the encrypted record store.
    pub(super) fn scalar_bytes(&self) -> Vec<u8> {
        self.key.to_bytes().to_vec()
    }
}
