//! Settings management
//!
//! Roost keeps its own settings outside the dotfiles repository, in a small
//! TOML file under the user's config directory. Every field has a default,
//! so a missing file is not an error and a partial file fills in the rest.

use crate::Result;
use roost_core::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level settings, one section per concern
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Repository location and manifest name
    #[serde(default)]
    pub general: GeneralSettings,

    /// Secret provider configuration
    #[serde(default)]
    pub vault: VaultSettings,

    /// Pre-apply backup behavior
    #[serde(default)]
    pub backup: BackupSettings,
}

/// General settings section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Dotfiles repository path; `~` expands to the home directory
    #[serde(default)]
    pub repo: Option<PathBuf>,

    /// Manifest file name inside the repository
    #[serde(default = "default_manifest")]
    pub manifest: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        GeneralSettings {
            repo: None,
            manifest: default_manifest(),
        }
    }
}

/// Secret provider settings section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultSettings {
    /// Path to the age identity file; `~` expands to the home directory
    #[serde(default)]
    pub identity: Option<PathBuf>,

    /// Explicit age recipient; derived from the identity when absent
    #[serde(default)]
    pub recipient: Option<String>,

    /// Encrypt pattern file, relative to the repository root
    #[serde(default = "default_patterns")]
    pub patterns: String,
}

impl Default for VaultSettings {
    fn default() -> Self {
        VaultSettings {
            identity: None,
            recipient: None,
            patterns: default_patterns(),
        }
    }
}

/// Backup settings section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSettings {
    /// Preserve displaced files before a forced apply replaces them
    #[serde(default = "default_backup_enabled")]
    pub enabled: bool,
}

impl Default for BackupSettings {
    fn default() -> Self {
        BackupSettings {
            enabled: default_backup_enabled(),
        }
    }
}

fn default_manifest() -> String {
    String::from("manifest.toml")
}

fn default_patterns() -> String {
    String::from(".roost/encrypt")
}

fn default_backup_enabled() -> bool {
    true
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Message(format!(
                "Failed to read settings file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        let settings: Self = toml::from_str(&content).map_err(|e| {
            Error::Message(format!(
                "Failed to parse settings file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        debug!(path = %path.as_ref().display(), "loaded settings");
        Ok(settings)
    }

    /// Load settings, falling back to defaults
    ///
    /// An explicitly given path must exist. Without one, the default
    /// location is tried and a missing file simply yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match crate::dirs::default_settings_file() {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// The configured repository path with `~` expanded, if one is set
    pub fn repo_dir(&self) -> Option<PathBuf> {
        self.general.repo.as_deref().map(expand_tilde)
    }

    /// The configured identity path with `~` expanded, if one is set
    pub fn identity_file(&self) -> Option<PathBuf> {
        self.vault.identity.as_deref().map(expand_tilde)
    }
}

/// Expand a leading `~` or `~/` to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };
    if text == "~" {
        return dirs::home_dir().unwrap_or_else(|| path.to_path_buf());
    }
    if let Some(rest) = text.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn full_settings_file_parses() {
        let settings: Settings = toml::from_str(
            r#"
            [general]
            repo = "~/dotfiles"
            manifest = "entries.toml"

            [vault]
            identity = "~/.config/roost/key.txt"
            recipient = "age1example"
            patterns = ".roost/sealed"

            [backup]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.general.repo, Some(PathBuf::from("~/dotfiles")));
        assert_eq!(settings.general.manifest, "entries.toml");
        assert_eq!(settings.vault.recipient.as_deref(), Some("age1example"));
        assert_eq!(settings.vault.patterns, ".roost/sealed");
        assert!(!settings.backup.enabled);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert!(settings.general.repo.is_none());
        assert_eq!(settings.general.manifest, "manifest.toml");
        assert_eq!(settings.vault.patterns, ".roost/encrypt");
        assert!(settings.vault.identity.is_none());
        assert!(settings.backup.enabled);
    }

    #[test]
    fn partial_section_fills_in_the_rest() {
        let settings: Settings = toml::from_str(
            r#"
            [general]
            repo = "/srv/dotfiles"
            "#,
        )
        .unwrap();
        assert_eq!(settings.general.manifest, "manifest.toml");
        assert_eq!(settings.repo_dir(), Some(PathBuf::from("/srv/dotfiles")));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_tilde(Path::new("~")), home);
        assert_eq!(
            expand_tilde(Path::new("~/dotfiles")),
            home.join("dotfiles")
        );
        assert_eq!(
            expand_tilde(Path::new("/absolute/stays")),
            PathBuf::from("/absolute/stays")
        );
    }

    #[test]
    fn load_reports_parse_errors_with_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general\nbroken").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = Settings::load_or_default(Some(Path::new("/nonexistent/roost.toml")));
        assert!(err.is_err());
    }

    #[test]
    fn load_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[backup]\nenabled = false\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(!settings.backup.enabled);
        assert_eq!(settings.general.manifest, "manifest.toml");
    }
}
