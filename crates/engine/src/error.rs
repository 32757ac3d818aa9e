//! Error types for the reconciliation engine

use roost_core::AbsPath;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the engine
///
/// Variants carry the path they failed on. Once an apply or collect run has
/// started, per-entry errors are downgraded to a failed outcome in the
/// report instead of surfacing here.
#[derive(Error, Debug)]
pub enum Error {
    /// Error reading a file
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a file
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error creating a directory
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error walking a directory
    #[error("Failed to read directory {path}: {source}")]
    DirectoryRead {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error with file metadata
    #[error("Failed to read metadata for {path}: {source}")]
    Metadata {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error preserving a displaced file
    #[error("Failed to back up {path}: {source}")]
    Backup {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// IO error without a more specific context
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Path handling error, including escape rejection
    #[error(transparent)]
    Core(#[from] roost_core::Error),

    /// Secret provider error
    #[error(transparent)]
    Vault(#[from] roost_vault::Error),
}
