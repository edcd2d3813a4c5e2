/// The single device-binding mode this client implements. A challenge that
/// declares anything else is a protocol compatibility failure.
pub const BINDING_MODE: &str = "device-secret-v1";

/// AES-256-GCM nonce length used for every symmetric encryption in the crate.
pub const NONCE_LEN: usize = 12;

/// Symmetric key length (AES-256-GCM), also the SHA-256 output length —
/// the delivery-key derivation relies on that equality.
pub const KEY_LEN: usize = 32;

#[derive(clap::Parser, Debug, Clone)]
pub struct Config {
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Portal base URL. Must be https or loopback.
    #[arg(long, default_value = "https://127.0.0.1:8443")]
    pub server: String,
    /// Override the data directory (defaults to the XDG data dir).
    #[arg(long)]
    pub data_dir: Option<std::path::PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Register a new account and enroll the issued certificate locally.
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Directory to write the certificate and key-recovery files into.
        #[arg(long, default_value = ".")]
        out_dir: std::path::PathBuf,
    },
    /// Log in with a certificate file, optionally re-enrolling a key file.
    Login {
        #[arg(long)]
        certificate: std::path::PathBuf,
        /// Private-key recovery file; supplying it re-enrolls this profile.
        #[arg(long)]
        key_file: Option<std::path::PathBuf>,
    },
    /// List enrolled certificate identifiers.
    List,
    /// Remove one enrolled identity.
    Remove {
        #[arg(long)]
        certificate_id: String,
    },
    /// Delete all enrolled identities and the vault master key, then exit.
    Wipe,
}
