//! Well-known directory locations
//!
//! Settings live under the platform config directory (`~/.config/roost` on
//! Linux); the repository itself defaults to `~/dotfiles`. All lookups can
//! fail on exotic systems, hence the `Option` returns.

use std::path::PathBuf;

/// The roost settings directory
///
/// Returns `$XDG_CONFIG_HOME/roost` or the platform equivalent.
#[must_use]
pub fn settings_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("roost"))
}

/// The default settings file path
///
/// Returns `<settings dir>/config.toml`.
#[must_use]
pub fn default_settings_file() -> Option<PathBuf> {
    settings_dir().map(|dir| dir.join("config.toml"))
}

/// The default dotfiles repository path
///
/// Returns `~/dotfiles`.
#[must_use]
pub fn default_repo_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("dotfiles"))
}

/// The default age identity file path
///
/// Returns `<settings dir>/key.txt`.
#[must_use]
pub fn default_identity_file() -> Option<PathBuf> {
    settings_dir().map(|dir| dir.join("key.txt"))
}
