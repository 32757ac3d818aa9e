//! Read-only inspection of destination state
//!
//! Status is computed on demand by comparing each destination against its
//! source and is never persisted anywhere. Inspection must not mutate the
//! filesystem, so everything here goes through read operations only.

use crate::content::{dirs_equal, files_equal, hash_data};
use crate::error::Result;
use crate::resolve::ResolvedEntry;
use crate::system::System;
use roost_core::AbsPath;
use roost_manifest::EntryKind;
use roost_vault::SecretProvider;
use std::fmt;
use tracing::debug;

/// Transient state of one destination relative to its declared source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStatus {
    /// Destination matches the declared state
    Ok,
    /// Destination does not exist yet
    Missing,
    /// Destination is a symlink pointing somewhere else
    WrongTarget,
    /// Destination exists but is not a symlink
    Conflict,
    /// Copy destination content differs from the source
    Changed,
    /// Repository source is absent
    MissingSource,
    /// Destination or provider plaintext could not be read
    Inaccessible,
}

impl ReconcileStatus {
    /// Short lowercase label
    pub const fn as_str(self) -> &'static str {
        match self {
            ReconcileStatus::Ok => "ok",
            ReconcileStatus::Missing => "missing",
            ReconcileStatus::WrongTarget => "wrong target",
            ReconcileStatus::Conflict => "conflict",
            ReconcileStatus::Changed => "changed",
            ReconcileStatus::MissingSource => "missing source",
            ReconcileStatus::Inaccessible => "inaccessible",
        }
    }

    /// Whether the entry needs attention from the user
    pub const fn needs_attention(self) -> bool {
        !matches!(self, ReconcileStatus::Ok)
    }
}

impl fmt::Display for ReconcileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes [`ReconcileStatus`] for resolved entries
pub struct Inspector<'a> {
    system: &'a dyn System,
    provider: Option<&'a dyn SecretProvider>,
}

impl<'a> Inspector<'a> {
    /// Create an inspector over a system
    pub fn new(system: &'a dyn System) -> Self {
        Inspector {
            system,
            provider: None,
        }
    }

    /// Attach the provider used to compare encrypted sources
    #[must_use]
    pub fn with_provider(mut self, provider: &'a dyn SecretProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Status of a single resolved entry
    ///
    /// Never fails: read errors (permission denied, locked provider, ...)
    /// degrade to [`ReconcileStatus::Inaccessible`], so one unreadable
    /// destination cannot hide the rest of a report.
    pub fn status(&self, resolved: &ResolvedEntry<'_>) -> ReconcileStatus {
        match self.try_status(resolved) {
            Ok(status) => status,
            Err(e) => {
                debug!(dest = %resolved.entry.dest, error = %e, "inspection failed");
                ReconcileStatus::Inaccessible
            }
        }
    }

    fn try_status(&self, resolved: &ResolvedEntry<'_>) -> Result<ReconcileStatus> {
        let source = &resolved.source;
        let dest = &resolved.dest;
        if !self.system.exists(source) && !self.system.is_symlink(source) {
            return Ok(ReconcileStatus::MissingSource);
        }
        match resolved.entry.kind {
            EntryKind::Symlink => self.symlink_status(source, dest),
            EntryKind::Copy => self.copy_status(source, dest),
            EntryKind::Encrypted => self.encrypted_status(source, dest),
        }
    }

    fn symlink_status(&self, source: &AbsPath, dest: &AbsPath) -> Result<ReconcileStatus> {
        if !self.system.is_symlink(dest) {
            if self.system.exists(dest) {
                return Ok(ReconcileStatus::Conflict);
            }
            return Ok(ReconcileStatus::Missing);
        }
        // A dangling link that points at the declared source is still ok.
        if link_matches(self.system, dest, source)? {
            Ok(ReconcileStatus::Ok)
        } else {
            Ok(ReconcileStatus::WrongTarget)
        }
    }

    fn copy_status(&self, source: &AbsPath, dest: &AbsPath) -> Result<ReconcileStatus> {
        if !self.system.exists(dest) {
            return Ok(ReconcileStatus::Missing);
        }
        let source_is_dir = self.system.metadata(source)?.is_dir();
        let dest_is_dir = self.system.metadata(dest)?.is_dir();
        let equal = match (source_is_dir, dest_is_dir) {
            (true, true) => dirs_equal(self.system, source, dest)?,
            (false, false) => files_equal(self.system, source, dest)?,
            _ => false,
        };
        if equal {
            Ok(ReconcileStatus::Ok)
        } else {
            Ok(ReconcileStatus::Changed)
        }
    }

    fn encrypted_status(&self, source: &AbsPath, dest: &AbsPath) -> Result<ReconcileStatus> {
        if !self.system.exists(dest) {
            return Ok(ReconcileStatus::Missing);
        }
        let Some(provider) = self.provider else {
            return Ok(ReconcileStatus::Inaccessible);
        };
        let plaintext = provider.decrypt(source)?;
        let dest_content = self.system.read_file(dest)?;
        if hash_data(&plaintext) == hash_data(&dest_content) {
            Ok(ReconcileStatus::Ok)
        } else {
            Ok(ReconcileStatus::Changed)
        }
    }
}

/// Whether the symlink at `dest` points at `source`
///
/// Only the immediate link target is considered; a chain of links is never
/// followed. Relative targets are resolved against the link's parent
/// directory before comparing.
pub(crate) fn link_matches(system: &dyn System, dest: &AbsPath, source: &AbsPath) -> Result<bool> {
    let target = system.read_link(dest)?;
    let absolute = if target.is_absolute() {
        AbsPath::new(target)?
    } else {
        match dest.parent() {
            Some(parent) => AbsPath::from_path(&parent.as_path().join(target))?,
            None => return Ok(false),
        }
    };
    Ok(absolute.normalized() == source.normalized())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(ReconcileStatus::Ok.as_str(), "ok");
        assert_eq!(ReconcileStatus::WrongTarget.as_str(), "wrong target");
        assert_eq!(ReconcileStatus::MissingSource.as_str(), "missing source");
    }

    #[test]
    fn only_ok_needs_no_attention() {
        assert!(!ReconcileStatus::Ok.needs_attention());
        assert!(ReconcileStatus::Missing.needs_attention());
        assert!(ReconcileStatus::Conflict.needs_attention());
        assert!(ReconcileStatus::Inaccessible.needs_attention());
    }
}
