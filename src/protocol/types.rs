use serde::{Deserialize, Serialize};

use super::ProtocolError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeRequest {
    pub certificate_id: String,
    pub device_id: String,
}

/// Server-issued challenge, held only for the duration of one login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub challenge_token: String,
    pub nonce: String, // base64
    pub binding_mode: String,
}

impl Challenge {
    pub fn nonce_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        decode_b64("challenge nonce", &self.nonce)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub challenge_token: String,
    pub device_id: String,
    pub device_proof: String, // hex
    pub signature: String,    // base64, raw r‖s
    /// Quantum-resistant signature slot; currently always absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pq_signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub client_public_keys: ClientPublicKeys,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientPublicKeys {
    pub signing: String, // base64, SEC1 uncompressed P-256 point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_quantum: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub delivery: Delivery,
    pub certificate_id: String,
    pub shared_secret: String, // base64
    pub device_secret: String, // base64
}

/// Encrypted certificate payload returned at registration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub ciphertext: String, // base64
    pub nonce: String,      // base64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: UserRecord,
    pub certificate: CertificateStatus,
    pub session: SessionInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateStatus {
    pub certificate_id: String,
    #[serde(default)]
    pub revoked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub expires_at: u64,
}

pub(crate) fn decode_b64(field: &str, value: &str) -> Result<Vec<u8>, ProtocolError> {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD
        .decode(value)
        .map_err(|_| ProtocolError::Network(format!("invalid base64 in {field}")))
}

pub(crate) fn encode_b64(bytes: &[u8]) -> String {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
