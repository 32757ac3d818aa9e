//! Error types for CLI commands
//!
//! Commands report failures through [`CommandError`]. Library errors keep
//! their own types and arrive here via `From`, so `?` works throughout the
//! command implementations while the final message still names the failing
//! layer.

use std::path::PathBuf;
use thiserror::Error;

/// Error data for `NotUnderHome`
///
/// Separated to allow boxing and reduce `CommandError` enum size
#[derive(Debug)]
pub struct NotUnderHomeError {
    /// The path outside the home directory
    pub path: PathBuf,
    /// The home directory
    pub home: PathBuf,
}

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// Some entries could not be reconciled
    #[error("{failed} out of {total} entries failed")]
    EntriesFailed {
        /// Number of entries that failed
        failed: usize,
        /// Total number of entries processed
        total: usize,
    },

    /// The manifest references things that do not hold up
    #[error("Manifest validation failed: {problems} problem(s)")]
    ManifestInvalid {
        /// Number of problems reported
        problems: usize,
    },

    /// A path that must live under the home directory does not
    #[error("Path {} is not under the home directory {}", .0.path.display(), .0.home.display())]
    NotUnderHome(Box<NotUnderHomeError>),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Directories cannot be stored as encrypted sources
    #[error("Cannot store a directory encrypted: {0}")]
    SecretDirectory(PathBuf),

    /// Encrypted operation requested without a usable provider
    #[error("No secret provider configured (set [vault] identity in the settings file)")]
    NoProvider,

    /// The home directory could not be determined
    #[error("Could not determine the home directory")]
    NoHomeDir,

    /// Manifest error
    #[error("Manifest error: {0}")]
    Manifest(#[from] roost_manifest::Error),

    /// Reconciliation error
    #[error("Reconcile error: {0}")]
    Engine(#[from] roost_engine::Error),

    /// Secret provider error
    #[error("Vault error: {0}")]
    Vault(#[from] roost_vault::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<roost_core::Error> for CommandError {
    fn from(err: roost_core::Error) -> Self {
        Self::Other(err.into())
    }
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;

impl CommandError {
    /// Create a `NotUnderHome` error
    #[must_use]
    pub fn not_under_home(path: PathBuf, home: PathBuf) -> Self {
        Self::NotUnderHome(Box::new(NotUnderHomeError { path, home }))
    }
}
