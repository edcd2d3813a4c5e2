#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Vault: {0}")]
    Vault(#[from] crate::vault::VaultError),
    #[error("Certificate: {0}")]
    Certificate(#[from] crate::certificate::CertificateError),
    #[error("Device: {0}")]
    Device(#[from] crate::device::DeviceError),
    #[error("Protocol: {0}")]
    Protocol(#[from] crate::protocol::ProtocolError),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Internal(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
