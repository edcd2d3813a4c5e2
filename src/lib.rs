pub mod certificate;
pub mod config;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod protocol;
pub mod session;
pub mod vault;

pub use error::{Error, Result};

use config::Command;

pub async fn run(cfg: config::Config) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    let level = match cfg.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .init();

    tracing::info!("Starting certbind");

    let data_dir = match &cfg.data_dir {
        Some(dir) => dir.clone(),
        None => directories::ProjectDirs::from("", "", "certbind")
            .ok_or_else(|| anyhow::anyhow!("cannot determine XDG data dir"))?
            .data_dir()
            .to_path_buf(),
    };

    // Preflight checks (secure context, storage reachability)
    diagnostics::check(&cfg, &data_dir)?;

    // Single-instance lock
    let lock_dir = std::env::var("XDG_RUNTIME_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| data_dir.clone());
    let lock_path = lock_dir.join("certbind.lock");
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(&lock_path)?;
    let mut lock = fd_lock::RwLock::new(lock_file);
    let _guard = lock.try_write()
        .map_err(|_| anyhow::anyhow!("certbind is already running (lock: {})", lock_path.display()))?;

    if matches!(cfg.command, Command::Wipe) {
        return wipe(&data_dir);
    }

    // Load or create the vault master key
    let master_key_path = data_dir.join("vault_key.blob");
    let master_key = load_or_create_master_key(&master_key_path)?;
    tracing::info!("Vault master key ready");

    // Initialize the key vault
    let identities_dir = data_dir.join("identities");
    std::fs::create_dir_all(&identities_dir)?;
    let mut vault = vault::KeyVault::load(master_key, identities_dir)
        .map_err(|e| anyhow::anyhow!("Failed to load key vault: {e}"))?;
    tracing::info!(count = vault.identity_count(), "Key vault loaded");

    match cfg.command {
        Command::Register {
            full_name,
            email,
            password,
            out_dir,
        } => {
            let api = protocol::HttpApi::new(&cfg.server)?;
            let outcome = protocol::register(
                &api,
                &mut vault,
                &protocol::RegistrationInput {
                    full_name,
                    email,
                    password,
                },
            )
            .await?;

            std::fs::create_dir_all(&out_dir)?;
            let cert_path = out_dir.join(format!("{}_certificate.txt", outcome.certificate_id));
            let key_path = out_dir.join(format!("{}_private-key.txt", outcome.certificate_id));
            std::fs::write(&cert_path, &outcome.certificate_text)?;
            std::fs::write(&key_path, &outcome.key_file_text)?;
            println!("Enrolled certificate {}", outcome.certificate_id);
            println!("Certificate saved to {}", cert_path.display());
            println!("Private-key recovery file saved to {}", key_path.display());
            println!("Keep the recovery file offline; it is the only export of the key.");
        }
        Command::Login {
            certificate,
            key_file,
        } => {
            let certificate_text = std::fs::read_to_string(&certificate)?;
            let certificate_filename = certificate
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string);
            let key_file_text = match &key_file {
                Some(path) => Some(std::fs::read_to_string(path)?),
                None => None,
            };

            let api = protocol::HttpApi::new(&cfg.server)?;
            let outcome = protocol::login(
                &api,
                &mut vault,
                protocol::LoginInput {
                    certificate_text: &certificate_text,
                    certificate_filename: certificate_filename.as_deref(),
                    key_file_text: key_file_text.as_deref(),
                },
            )
            .await?;

            let mut session = session::SessionHandle::authenticated(outcome.token.clone());
            let view = session.synchronize(&api).await?;
            println!(
                "Logged in as {} ({}) with certificate {}",
                view.user.full_name, view.user.email, outcome.certificate_id
            );
        }
        Command::List => {
            for id in vault.list_identities() {
                println!("{id}");
            }
        }
        Command::Remove { certificate_id } => {
            if vault.remove(&certificate_id)? {
                println!("Removed identity {certificate_id}");
            } else {
                println!("No identity enrolled for {certificate_id}");
            }
        }
        Command::Wipe => unreachable!("handled before vault initialization"),
    }

    Ok(())
}

/// Delete all enrolled identities and the master key.
fn wipe(data_dir: &std::path::Path) -> anyhow::Result<()> {
    let identities_dir = data_dir.join("identities");
    let mut count = 0usize;
    if identities_dir.exists() {
        for entry in std::fs::read_dir(&identities_dir)? {
            std::fs::remove_file(entry?.path())?;
            count += 1;
        }
    }
    println!("Deleted {count} identity record(s) from {}", identities_dir.display());

    let master_key_path = data_dir.join("vault_key.blob");
    if master_key_path.exists() {
        std::fs::remove_file(&master_key_path)?;
        println!("Vault master key deleted (will be recreated on next start)");
    }
    Ok(())
}

/// Load the vault master key, or create it on first run. The key file is
/// the vault's secure boundary: mode 0600, never leaves this directory.
fn load_or_create_master_key(path: &std::path::Path) -> anyhow::Result<[u8; 32]> {
    if path.exists() {
        let bytes = std::fs::read(path)?;
        if bytes.len() != 32 {
            anyhow::bail!("vault_key.blob is corrupt (expected 32 bytes, got {})", bytes.len());
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        Ok(key)
    } else {
        use rand::RngCore;
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        std::fs::write(path, key)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(key)
    }
}
