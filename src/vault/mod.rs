pub mod disk;
pub mod handle;
pub mod index;
pub mod record;
pub mod secret;

pub use handle::{GeneratedKeypair, SigningKeyHandle};
pub use index::{IdentitySummary, KeyVault};

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("secure storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("insecure context: {0}")]
    InsecureContext(String),
    #[error("no enrolled key material for '{0}'; re-enrollment required")]
    KeyMissing(String),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialize: {0}")]
    Serialization(String),
    #[error("Encrypt: {0}")]
    Encryption(String),
    #[error("Corrupt: {0}")]
    Corrupt(String),
}
