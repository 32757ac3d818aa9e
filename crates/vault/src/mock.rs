//! Header-framed fake provider
//!
//! Sealing prepends a fixed header to the plaintext; decrypting strips it
//! again. This lets engine and CLI tests exercise encrypted entries without
//! an age binary on the machine, while still catching code paths that read
//! ciphertext as if it were plaintext.

use crate::{Error, Result, SecretProvider};
use roost_core::AbsPath;

/// Marker the fake puts in front of sealed content
pub const HEADER: &[u8] = b"!mock-sealed!\n";

/// In-tests replacement for [`crate::AgeCli`]
#[derive(Debug, Clone)]
pub struct MockVault {
    unlocked: bool,
}

impl MockVault {
    /// An unlocked provider
    pub fn new() -> Self {
        MockVault { unlocked: true }
    }

    /// A provider that refuses to decrypt or encrypt
    pub fn locked() -> Self {
        MockVault { unlocked: false }
    }

    fn require_unlocked(&self) -> Result<()> {
        if self.unlocked {
            Ok(())
        } else {
            Err(Error::AuthenticationRequired("mock vault is locked".to_string()))
        }
    }
}

impl Default for MockVault {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretProvider for MockVault {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    fn decrypt(&self, path: &AbsPath) -> Result<Vec<u8>> {
        self.require_unlocked()?;
        let content = std::fs::read(path.as_path()).map_err(Error::Io)?;
        content
            .strip_prefix(HEADER)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::InvalidCiphertext {
                path: path.as_path().to_path_buf(),
            })
    }

    fn encrypt(&self, plaintext: &[u8], path: &AbsPath) -> Result<()> {
        self.require_unlocked()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent.as_path()).map_err(Error::Io)?;
        }
        let mut sealed = Vec::with_capacity(HEADER.len() + plaintext.len());
        sealed.extend_from_slice(HEADER);
        sealed.extend_from_slice(plaintext);
        std::fs::write(path.as_path(), sealed).map_err(Error::Io)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn seal_and_unseal_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = AbsPath::from_path(&dir.path().join("secrets/token")).unwrap();

        let vault = MockVault::new();
        vault.encrypt(b"hunter2", &path).unwrap();

        let on_disk = std::fs::read(path.as_path()).unwrap();
        assert!(on_disk.starts_with(HEADER));
        assert_eq!(vault.decrypt(&path).unwrap(), b"hunter2");
    }

    #[test]
    fn plaintext_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = AbsPath::from_path(&dir.path().join("token")).unwrap();
        std::fs::write(path.as_path(), b"not sealed").unwrap();

        let err = MockVault::new().decrypt(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidCiphertext { .. }));
    }

    #[test]
    fn locked_vault_refuses_both_directions() {
        let dir = tempfile::tempdir().unwrap();
        let path = AbsPath::from_path(&dir.path().join("token")).unwrap();

        let vault = MockVault::locked();
        assert!(!vault.is_unlocked());
        assert!(matches!(
            vault.encrypt(b"x", &path),
            Err(Error::AuthenticationRequired(_))
        ));
        assert!(matches!(vault.decrypt(&path), Err(Error::AuthenticationRequired(_))));
    }
}
