//! Base error types for roost
//!
//! This module provides the foundation error types that all crates can use.

use std::path::PathBuf;
use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Path is not absolute
    #[error("Path must be absolute: {path}")]
    PathNotAbsolute { path: PathBuf },

    /// Path is not relative
    #[error("Path must be relative: {path}")]
    PathNotRelative { path: PathBuf },

    /// Path is not under the expected base directory
    #[error("Path {} is not under base directory {}", path.display(), base.display())]
    InvalidPathPrefix { path: PathBuf, base: PathBuf },

    /// Relative path escapes the directory it must resolve inside of
    #[error("Path {} escapes {}", path.display(), root.display())]
    PathEscape { path: PathBuf, root: PathBuf },

    /// Unrecognized platform name
    #[error("Unknown platform: {0} (expected darwin, linux or windows)")]
    UnknownPlatform(String),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn path_escape_names_both_paths() {
        let err = Error::PathEscape {
            path: PathBuf::from("../../etc/passwd"),
            root: PathBuf::from("/home/user"),
        };
        let msg = err.to_string();
        assert!(msg.contains("../../etc/passwd"));
        assert!(msg.contains("/home/user"));
    }

    #[test]
    fn unknown_platform_lists_valid_names() {
        let msg = Error::UnknownPlatform("beos".into()).to_string();
        assert!(msg.contains("beos"));
        assert!(msg.contains("darwin"));
    }
}
