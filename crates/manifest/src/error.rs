//! Error types for manifest loading and mutation

use roost_core::{Platform, RelPath};
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while reading, validating or writing a manifest
#[derive(Error, Debug)]
pub enum Error {
    /// Manifest file does not exist
    #[error("manifest not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Manifest file is not valid TOML or has an unknown section
    #[error("failed to parse manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    /// Manifest could not be serialized back to TOML
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// An entry carries a path that cannot be used
    #[error("invalid manifest entry ({source_path} -> {dest_path}): {reason}")]
    InvalidEntry {
        source_path: String,
        dest_path: String,
        reason: String,
    },

    /// Destination is already tracked by an overlapping entry
    #[error("destination already tracked: {dest}{}", platform_suffix(*platform))]
    Duplicate {
        dest: RelPath,
        platform: Option<Platform>,
    },

    /// IO failure while reading or writing the manifest file
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the core path types
    #[error(transparent)]
    Core(#[from] roost_core::Error),
}

fn platform_suffix(platform: Option<Platform>) -> String {
    match platform {
        Some(p) => format!(" (platform {p})"),
        None => String::new(),
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn duplicate_message_mentions_platform_when_qualified() {
        let dest = RelPath::new(".gitconfig".into()).unwrap();
        let plain = Error::Duplicate {
            dest: dest.clone(),
            platform: None,
        };
        assert_eq!(plain.to_string(), "destination already tracked: .gitconfig");

        let qualified = Error::Duplicate {
            dest,
            platform: Some(Platform::Darwin),
        };
        assert!(qualified.to_string().ends_with("(platform darwin)"));
    }
}
