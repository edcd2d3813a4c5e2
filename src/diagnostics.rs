use std::path::Path;

use crate::config::Config;
use crate::vault::VaultError;

/// Preflight checks, all evaluated before anything touches the vault.
pub fn check(cfg: &Config, data_dir: &Path) -> anyhow::Result<()> {
    let mut errors: Vec<VaultError> = Vec::new();

    // Check 1: protected origin. Key material only moves over https; plain
    // http is allowed for loopback development servers only.
    match reqwest::Url::parse(&cfg.server) {
        Ok(url) => {
            let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
            if url.scheme() != "https" && !loopback {
                errors.push(VaultError::InsecureContext(format!(
                    "server '{}' is neither https nor loopback",
                    cfg.server
                )));
            }
        }
        Err(e) => errors.push(VaultError::InsecureContext(format!(
            "cannot parse server URL '{}': {e}",
            cfg.server
        ))),
    }

    // Check 2: storage backend reachable and writable.
    if let Err(e) = std::fs::create_dir_all(data_dir) {
        errors.push(VaultError::StorageUnavailable(format!(
            "cannot create {}: {e}",
            data_dir.display()
        )));
    } else {
        let probe = data_dir.join(".write-probe");
        match std::fs::write(&probe, b"probe") {
            Ok(()) => {
                let _ = std::fs::remove_file(&probe);
            }
            Err(e) => errors.push(VaultError::StorageUnavailable(format!(
                "cannot write to {}: {e}",
                data_dir.display()
            ))),
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    for err in &errors {
        eprintln!("ERROR: {err}");
    }
    anyhow::bail!("{} preflight check(s) failed", errors.len())
}
