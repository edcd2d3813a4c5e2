use certbind::device::{derive, proof, reconcile, DeviceError};
use certbind::vault::{secret, KeyVault, SigningKeyHandle};

#[test]
fn test_derive_is_deterministic_hex() {
    let a = derive(b"device secret");
    let b = derive(b"device secret");
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(derive(b"other secret"), a);
}

#[test]
fn test_proof_depends_on_both_inputs() {
    let p = proof(b"secret", b"nonce");
    assert_eq!(p, proof(b"secret", b"nonce"));
    assert_ne!(p, proof(b"secret2", b"nonce"));
    assert_ne!(p, proof(b"secret", b"nonce2"));
    // Proof and derived id use the digest differently.
    assert_ne!(p, derive(b"secret"));
}

#[test]
fn test_reconcile_fails_closed_on_mismatch() {
    let derived = derive(b"secret");

    // No embedded id: trust the derivation.
    assert_eq!(reconcile(None, &derived).unwrap(), derived);
    // Matching embedded id: fine.
    assert_eq!(reconcile(Some(&derived), &derived).unwrap(), derived);
    // Mismatch: never silently trusts either side.
    match reconcile(Some("abc123"), "xyz789") {
        Err(DeviceError::BindingMismatch { embedded, derived }) => {
            assert_eq!(embedded, "abc123");
            assert_eq!(derived, "xyz789");
        }
        other => panic!("expected BindingMismatch, got {other:?}"),
    }
}

#[test]
fn test_bind_reveal_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let key = [0x77u8; 32];
    let mut vault = KeyVault::load(key, dir.path().to_path_buf()).unwrap();
    vault.store("cert-1", &SigningKeyHandle::generate().handle).unwrap();

    assert!(secret::reveal(&vault, "cert-1").is_none(), "unbound reveals None");

    secret::bind(&mut vault, "cert-1", b"exact secret bytes", None).unwrap();
    assert_eq!(secret::reveal(&vault, "cert-1").unwrap(), b"exact secret bytes");

    // Survives a reload from disk.
    drop(vault);
    let vault = KeyVault::load(key, dir.path().to_path_buf()).unwrap();
    assert_eq!(secret::reveal(&vault, "cert-1").unwrap(), b"exact secret bytes");
}

#[test]
fn test_bind_requires_identity() {
    let dir = tempfile::tempdir().unwrap();
    let mut vault = KeyVault::load([0x10u8; 32], dir.path().to_path_buf()).unwrap();
    assert!(secret::bind(&mut vault, "ghost", b"secret", None).is_err());
}

#[test]
fn test_tampered_record_file_reveals_none() {
    // Flipping a byte in the stored file breaks the outer AEAD layer: the
    // record is skipped on reload and the secret reads as unavailable.
    let dir = tempfile::tempdir().unwrap();
    let key = [0x88u8; 32];
    let mut vault = KeyVault::load(key, dir.path().to_path_buf()).unwrap();
    vault.store("cert-1", &SigningKeyHandle::generate().handle).unwrap();
    secret::bind(&mut vault, "cert-1", b"secret", None).unwrap();
    drop(vault);

    let entry = std::fs::read_dir(dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    let mut bytes = std::fs::read(&entry).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    std::fs::write(&entry, bytes).unwrap();

    let vault = KeyVault::load(key, dir.path().to_path_buf()).unwrap();
    assert!(secret::reveal(&vault, "cert-1").is_none());
}

#[test]
fn test_explicit_key_rotation() {
    let dir = tempfile::tempdir().unwrap();
    let mut vault = KeyVault::load([0x99u8; 32], dir.path().to_path_buf()).unwrap();
    vault.store("cert-1", &SigningKeyHandle::generate().handle).unwrap();

    secret::bind(&mut vault, "cert-1", b"secret", None).unwrap();
    // Rotate to a caller-provided key; the secret still round-trips.
    secret::bind(&mut vault, "cert-1", b"secret", Some([0x44u8; 32])).unwrap();
    assert_eq!(secret::reveal(&vault, "cert-1").unwrap(), b"secret");
}
