//! Type-safe path types
//!
//! This module provides two distinct path types using the newtype pattern:
//!
//! - [`AbsPath`]: Absolute filesystem paths
//! - [`RelPath`]: Relative paths (no leading slash)
//!
//! Manifest entries store [`RelPath`] values; joining one onto an [`AbsPath`]
//! base (the repository or the home directory) yields the concrete location a
//! reconciliation touches. These types prevent common path manipulation errors
//! at compile time.
//!
//! # Examples
//!
//! ```
//! use roost_core::path::{AbsPath, RelPath};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Create an absolute path
//! let home = AbsPath::new("/home/user".into())?;
//!
//! // Create a relative path
//! let config = RelPath::new(".config/nvim/init.lua".into())?;
//!
//! // Join them to get a new absolute path
//! let nvim_config = home.join(&config);
//! assert_eq!(nvim_config.as_path().to_str().unwrap(), "/home/user/.config/nvim/init.lua");
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// An absolute path on the filesystem
///
/// This type guarantees that the path is absolute (starts with `/` on Unix or
/// a drive letter on Windows). Use this for file operations and as base
/// directories.
///
/// # Examples
///
/// ```
/// use roost_core::path::AbsPath;
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let abs = AbsPath::new("/home/user".into())?;
/// assert_eq!(abs.as_path(), std::path::Path::new("/home/user"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbsPath(PathBuf);

impl AbsPath {
    /// Create a new `AbsPath` from a `PathBuf`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    ///
    /// # Examples
    ///
    /// ```
    /// use roost_core::path::AbsPath;
    /// use std::path::PathBuf;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let abs = AbsPath::new("/home/user".into())?;
    /// assert!(abs.as_path().is_absolute());
    ///
    /// let err = AbsPath::new("relative/path".into());
    /// assert!(err.is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.is_absolute() {
            Ok(AbsPath(path))
        } else {
            Err(Error::PathNotAbsolute { path })
        }
    }

    /// Create a new `AbsPath` from a reference to a `Path`
    ///
    /// This will clone the path internally.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::new(path.to_path_buf())
    }

    /// Get the underlying `Path`
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Convert to a `PathBuf`
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Join with a relative path to create a new absolute path
    ///
    /// # Examples
    ///
    /// ```
    /// use roost_core::path::{AbsPath, RelPath};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let home = AbsPath::new("/home/user".into())?;
    /// let config = RelPath::new(".config".into())?;
    /// let path = home.join(&config);
    /// assert_eq!(path.as_path().to_str().unwrap(), "/home/user/.config");
    /// # Ok(())
    /// # }
    /// ```
    pub fn join(&self, rel: &RelPath) -> Self {
        AbsPath(self.0.join(rel.as_path()))
    }

    /// Get the parent directory
    ///
    /// Returns `None` if this is the root directory.
    pub fn parent(&self) -> Option<Self> {
        self.0.parent().map(|p| AbsPath(p.to_path_buf()))
    }

    /// Strip a base directory prefix to get a relative path
    ///
    /// # Errors
    ///
    /// Returns an error if `self` is not under `base`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roost_core::path::{AbsPath, RelPath};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let home = AbsPath::new("/home/user".into())?;
    /// let file = AbsPath::new("/home/user/.bashrc".into())?;
    /// let rel = file.strip_prefix(&home)?;
    /// assert_eq!(rel.as_path().to_str().unwrap(), ".bashrc");
    /// # Ok(())
    /// # }
    /// ```
    pub fn strip_prefix(&self, base: &AbsPath) -> Result<RelPath> {
        self.0
            .strip_prefix(&base.0)
            .map(|p| RelPath(p.to_path_buf()))
            .map_err(|_| Error::InvalidPathPrefix {
                path: self.0.clone(),
                base: base.0.clone(),
            })
    }

    /// Check whether `self` is `base` or lies under it
    pub fn starts_with(&self, base: &AbsPath) -> bool {
        self.0.starts_with(&base.0)
    }

    /// Get the file name
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|s| s.to_str())
    }

    /// Resolve `.` and `..` components lexically, without touching the
    /// filesystem
    ///
    /// `..` at the root stays at the root. Symlinks are not followed; the
    /// result describes where the path points textually, which is exactly
    /// what containment checks need before anything exists on disk.
    ///
    /// # Examples
    ///
    /// ```
    /// use roost_core::path::AbsPath;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let path = AbsPath::new("/home/user/../other/./file".into())?;
    /// assert_eq!(path.normalized().as_path().to_str().unwrap(), "/home/other/file");
    /// # Ok(())
    /// # }
    /// ```
    pub fn normalized(&self) -> Self {
        let mut out = PathBuf::new();
        for component in self.0.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    // Never pop past the root; "/.." is "/".
                    if out.parent().is_some() {
                        out.pop();
                    }
                }
                other => out.push(other),
            }
        }
        AbsPath(out)
    }
}

/// A relative path (no leading slash)
///
/// This type guarantees that the path is relative (does not start with `/`).
/// Use this for paths relative to a base directory.
///
/// # Examples
///
/// ```
/// use roost_core::path::RelPath;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let rel = RelPath::new(".config/nvim/init.lua".into())?;
/// assert_eq!(rel.as_path().to_str().unwrap(), ".config/nvim/init.lua");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelPath(PathBuf);

impl RelPath {
    /// Create a new `RelPath` from a `PathBuf`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is absolute or empty.
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.as_os_str().is_empty() {
            Err(Error::PathNotRelative { path })
        } else if path.is_relative() {
            Ok(RelPath(path))
        } else {
            Err(Error::PathNotRelative { path })
        }
    }

    /// Create a new `RelPath` from a string slice
    ///
    /// # Errors
    ///
    /// Returns an error if the path is absolute or empty.
    pub fn from_str_path(path: &str) -> Result<Self> {
        Self::new(PathBuf::from(path))
    }

    /// Get the underlying `Path`
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Convert to a `PathBuf`
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Join with another relative path
    ///
    /// # Examples
    ///
    /// ```
    /// use roost_core::path::RelPath;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = RelPath::new(".config".into())?;
    /// let nvim = RelPath::new("nvim".into())?;
    /// let path = config.join(&nvim);
    /// assert_eq!(path.as_path().to_str().unwrap(), ".config/nvim");
    /// # Ok(())
    /// # }
    /// ```
    pub fn join(&self, other: &RelPath) -> Self {
        RelPath(self.0.join(&other.0))
    }

    /// Get the parent directory
    ///
    /// Returns `None` if this is a single component path.
    pub fn parent(&self) -> Option<Self> {
        self.0.parent().and_then(|p| {
            if p.as_os_str().is_empty() {
                None
            } else {
                Some(RelPath(p.to_path_buf()))
            }
        })
    }

    /// Get the file name
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|s| s.to_str())
    }

    /// Render with forward slashes regardless of platform
    ///
    /// Manifest files and glob patterns always use `/` as the separator.
    pub fn to_slash_string(&self) -> String {
        let parts: Vec<String> = self
            .0
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        parts.join("/")
    }
}

impl std::fmt::Display for AbsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl std::fmt::Display for RelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn abs_path_rejects_relative() {
        assert!(AbsPath::new("not/absolute".into()).is_err());
        assert!(AbsPath::new("/absolute".into()).is_ok());
    }

    #[test]
    fn rel_path_rejects_absolute_and_empty() {
        assert!(RelPath::new("/etc/passwd".into()).is_err());
        assert!(RelPath::new(PathBuf::new()).is_err());
        assert!(RelPath::new(".bashrc".into()).is_ok());
    }

    #[test]
    fn join_and_strip_round_trip() {
        let base = AbsPath::new("/home/user".into()).unwrap();
        let rel = RelPath::new(".config/fish/config.fish".into()).unwrap();
        let joined = base.join(&rel);
        assert_eq!(joined.strip_prefix(&base).unwrap(), rel);
    }

    #[test]
    fn strip_prefix_outside_base_fails() {
        let base = AbsPath::new("/home/user".into()).unwrap();
        let other = AbsPath::new("/etc/passwd".into()).unwrap();
        assert!(other.strip_prefix(&base).is_err());
    }

    #[test]
    fn normalized_resolves_dots() {
        let path = AbsPath::new("/home/user/./a/../b".into()).unwrap();
        assert_eq!(path.normalized().as_path(), Path::new("/home/user/b"));
    }

    #[test]
    fn normalized_stops_at_root() {
        let path = AbsPath::new("/../../etc".into()).unwrap();
        assert_eq!(path.normalized().as_path(), Path::new("/etc"));
    }

    #[test]
    fn normalized_detects_escape() {
        let home = AbsPath::new("/home/user".into()).unwrap();
        let rel = RelPath::new("../../etc/passwd".into()).unwrap();
        let resolved = home.join(&rel).normalized();
        assert!(!resolved.starts_with(&home));
    }

    #[test]
    fn rel_parent_of_single_component_is_none() {
        let rel = RelPath::new(".bashrc".into()).unwrap();
        assert!(rel.parent().is_none());
        let nested = RelPath::new(".config/nvim".into()).unwrap();
        assert_eq!(nested.parent().unwrap().as_path(), Path::new(".config"));
    }

    #[test]
    fn slash_string_is_separator_stable() {
        let rel = RelPath::new(".config/nvim/init.lua".into()).unwrap();
        assert_eq!(rel.to_slash_string(), ".config/nvim/init.lua");
    }
}
