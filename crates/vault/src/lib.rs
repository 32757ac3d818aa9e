//! Secret material handling for roost
//!
//! Some tracked files (SSH keys, API tokens) must never sit in the
//! repository as plaintext. Their sources are stored encrypted, and this
//! crate provides the [`SecretProvider`] abstraction the engine uses to turn
//! ciphertext into destination content and back.
//!
//! Which sources count as encrypted is decided by a pattern file inside the
//! repository (see [`patterns::EncryptPatterns`]); the manifest itself never
//! records encryption.

use roost_core::AbsPath;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for vault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for secret providers
#[derive(Error, Debug)]
pub enum Error {
    #[error("Provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Not a recognized ciphertext: {}", path.display())]
    InvalidCiphertext { path: PathBuf },

    #[error("Invalid pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

// age/rage CLI provider
pub mod age;
// Header-framed fake used by tests
pub mod mock;
// Which repository sources are stored encrypted
pub mod patterns;

pub use age::AgeCli;
pub use mock::MockVault;
pub use patterns::EncryptPatterns;

/// Trait for secret providers
///
/// The engine only ever needs three things from a provider: plaintext for an
/// encrypted source, sealing new plaintext back into that source, and
/// whether decryption can be expected to work right now.
pub trait SecretProvider: Send + Sync {
    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Whether decryption is currently possible (identity present, agent
    /// running, ...)
    fn is_unlocked(&self) -> bool;

    /// Decrypt the ciphertext file at `path` and return the plaintext
    fn decrypt(&self, path: &AbsPath) -> Result<Vec<u8>>;

    /// Encrypt `plaintext` and write the ciphertext to `path`
    ///
    /// Parent directories are created as needed.
    fn encrypt(&self, plaintext: &[u8], path: &AbsPath) -> Result<()>;
}
