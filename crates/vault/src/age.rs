//! age CLI integration
//!
//! Encrypted sources are age files; encryption and decryption shell out to
//! the `age` binary (or its Rust reimplementation `rage`, whichever is on
//! `PATH`). Decryption uses the identity file from the configuration,
//! encryption targets the configured recipient, derived from the identity
//! via `age-keygen -y` when none is configured.
//!
//! stdin stays connected to the terminal during decryption so
//! passphrase-protected identities can prompt.

use crate::{Error, Result, SecretProvider};
use roost_core::AbsPath;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use tracing::debug;

/// age CLI provider
///
/// Resolved once at construction; a missing binary surfaces immediately
/// instead of per entry.
pub struct AgeCli {
    binary: PathBuf,
    identity: PathBuf,
    recipient: Option<String>,
    /// Recipient derived from the identity, cached per process
    derived: Mutex<Option<String>>,
}

impl AgeCli {
    /// Create a provider backed by `age` or `rage`
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProviderNotAvailable`] if neither binary is on
    /// `PATH`.
    pub fn new(identity: PathBuf, recipient: Option<String>) -> Result<Self> {
        let binary = which::which("age")
            .or_else(|_| which::which("rage"))
            .map_err(|_| {
                Error::ProviderNotAvailable(
                    "age CLI not found in PATH (install age or rage)".to_string(),
                )
            })?;
        debug!(binary = %binary.display(), "resolved age binary");

        Ok(AgeCli {
            binary,
            identity,
            recipient,
            derived: Mutex::new(None),
        })
    }

    /// The identity file used for decryption
    pub fn identity(&self) -> &std::path::Path {
        &self.identity
    }

    fn require_identity(&self) -> Result<()> {
        if self.identity.is_file() {
            Ok(())
        } else {
            Err(Error::AuthenticationRequired(format!(
                "identity file not found: {}",
                self.identity.display()
            )))
        }
    }

    /// The recipient to encrypt new content to
    ///
    /// An explicitly configured recipient wins. Otherwise the public key is
    /// derived from the identity file with `age-keygen -y` and cached.
    fn resolve_recipient(&self) -> Result<String> {
        if let Some(recipient) = &self.recipient {
            return Ok(recipient.clone());
        }

        if let Ok(guard) = self.derived.lock()
            && let Some(recipient) = guard.as_ref()
        {
            return Ok(recipient.clone());
        }

        self.require_identity()?;
        let keygen = which::which("age-keygen")
            .or_else(|_| which::which("rage-keygen"))
            .map_err(|_| {
                Error::InvalidArguments(
                    "vault.recipient is not configured and age-keygen is not on PATH to derive one"
                        .to_string(),
                )
            })?;

        let output = Command::new(keygen)
            .arg("-y")
            .arg(&self.identity)
            .output()
            .map_err(Error::Io)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExecutionFailed(format!(
                "age-keygen -y {} failed: {}",
                self.identity.display(),
                stderr.trim()
            )));
        }

        let recipient = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if recipient.is_empty() {
            return Err(Error::ExecutionFailed(
                "age-keygen -y produced no recipient".to_string(),
            ));
        }
        debug!(%recipient, "derived recipient from identity");

        if let Ok(mut guard) = self.derived.lock() {
            *guard = Some(recipient.clone());
        }
        Ok(recipient)
    }
}

impl SecretProvider for AgeCli {
    fn name(&self) -> &'static str {
        "age"
    }

    fn is_unlocked(&self) -> bool {
        self.identity.is_file()
    }

    fn decrypt(&self, path: &AbsPath) -> Result<Vec<u8>> {
        self.require_identity()?;

        let output = Command::new(&self.binary)
            .arg("--decrypt")
            .arg("--identity")
            .arg(&self.identity)
            .arg(path.as_path())
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(Error::Io)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.contains("no identity matched") {
                return Err(Error::AuthenticationRequired(stderr.to_string()));
            }
            return Err(Error::ExecutionFailed(format!(
                "age --decrypt {} failed: {}",
                path,
                if stderr.is_empty() { "unknown error" } else { stderr }
            )));
        }

        Ok(output.stdout)
    }

    fn encrypt(&self, plaintext: &[u8], path: &AbsPath) -> Result<()> {
        let recipient = self.resolve_recipient()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent.as_path()).map_err(Error::Io)?;
        }

        let mut child = Command::new(&self.binary)
            .arg("--encrypt")
            .arg("--recipient")
            .arg(&recipient)
            .arg("--output")
            .arg(path.as_path())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(Error::Io)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(plaintext).map_err(Error::Io)?;
        }

        let output = child.wait_with_output().map_err(Error::Io)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(Error::ExecutionFailed(format!(
                "age --encrypt to {} failed: {}",
                path,
                if stderr.is_empty() { "unknown error" } else { stderr }
            )));
        }

        debug!(path = %path, "encrypted");
        Ok(())
    }
}
