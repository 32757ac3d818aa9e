//! Manifest entry types
//!
//! A [`FileEntry`] describes one managed file: where it lives in the
//! repository, where it belongs under the home directory, how it is
//! materialized, and which platform (if any) it is restricted to.

use roost_core::{Platform, RelPath};
use serde::{Deserialize, Serialize};

/// How a managed file is materialized at its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Destination is a symlink pointing at the repository source
    Symlink,
    /// Destination is an independent copy of the repository source
    Copy,
    /// Destination is a plaintext copy of an encrypted repository source
    Encrypted,
}

impl EntryKind {
    /// Lowercase name used in output tables
    pub const fn as_str(self) -> &'static str {
        match self {
            EntryKind::Symlink => "symlink",
            EntryKind::Copy => "copy",
            EntryKind::Encrypted => "encrypted",
        }
    }

    /// Whether destination edits can be gathered back into the repository
    ///
    /// Symlinked destinations share storage with their source, so there is
    /// nothing to collect.
    pub const fn is_collectable(self) -> bool {
        !matches!(self, EntryKind::Symlink)
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single managed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the repository root
    pub source: RelPath,

    /// Path relative to the home directory
    pub dest: RelPath,

    /// Materialization strategy
    pub kind: EntryKind,

    /// Restrict this entry to one platform; `None` applies everywhere
    pub platform: Option<Platform>,
}

impl FileEntry {
    /// Create an entry that applies on every platform
    pub fn new(source: RelPath, dest: RelPath, kind: EntryKind) -> Self {
        FileEntry {
            source,
            dest,
            kind,
            platform: None,
        }
    }

    /// Restrict the entry to a platform
    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }

    /// Whether this entry participates in reconciliation on `platform`
    pub fn active_on(&self, platform: Platform) -> bool {
        match self.platform {
            None => true,
            Some(p) => p == platform,
        }
    }
}

/// Whether two platform qualifiers can both be active at once
///
/// An unqualified entry is active everywhere, so it overlaps any qualifier.
pub fn platforms_overlap(a: Option<Platform>, b: Option<Platform>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}
