pub mod http;
pub mod login;
pub mod register;
pub mod types;

pub use http::{AuthApi, HttpApi};
pub use login::{login, LoginInput, LoginOutcome};
pub use register::{register, RegistrationInput, RegistrationOutcome};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The server declared a device-binding mode this client does not
    /// implement. Compatibility failure, not retried.
    #[error("unsupported binding mode '{0}'")]
    UnsupportedBindingMode(String),
    /// The delivery bundle failed AEAD authentication (tampered bundle or
    /// wrong password). No partial plaintext is revealed.
    #[error("certificate delivery bundle could not be decrypted")]
    DeliveryDecryptionFailed,
    /// Server-side rejection; the message is the server's, verbatim.
    #[error("{0}")]
    Rejected(String),
    /// Transport failure or malformed collaborator response.
    #[error("network failure: {0}")]
    Network(String),
}
