//! Forward reconciliation: materialize manifest entries under home
//!
//! Entries are processed sequentially in manifest order. Each entry is its
//! own unit of work; a failure is recorded in the report and the run keeps
//! going. Existing destinations that do not match are never touched without
//! force.

use crate::backup::BackupSession;
use crate::content::{dirs_equal, files_equal};
use crate::error::Result;
use crate::inspect::link_matches;
use crate::outcome::Outcome;
use crate::report::Report;
use crate::resolve::{ResolvedEntry, Resolver};
use crate::system::System;
use roost_core::{AbsPath, RelPath};
use roost_manifest::{EntryKind, FileEntry};
use roost_vault::SecretProvider;
use tracing::{debug, warn};

/// Destination path fragments that force owner-only permissions
const SENSITIVE_MARKERS: &[&str] = &["ssh", "secret", "key", "credential", "token", "password"];

/// Whether a destination path warrants owner-only permissions
pub fn is_sensitive(dest: &RelPath) -> bool {
    let lowered = dest.to_slash_string().to_lowercase();
    SENSITIVE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Options controlling an apply run
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Replace conflicting destinations instead of reporting them
    pub force: bool,
    /// Classify without mutating; backups and provider writes are skipped
    pub dry_run: bool,
    /// Preserve displaced files under the repository before replacing them
    pub backup: bool,
}

/// Applies and collects manifest entries against a pair of roots
///
/// Holds a [`System`] so the caller decides whether operations hit the disk
/// or a dry-run recorder, and optionally a [`SecretProvider`] for encrypted
/// entries.
pub struct Reconciler<'a> {
    system: &'a dyn System,
    resolver: &'a Resolver,
    provider: Option<&'a dyn SecretProvider>,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over a system and resolved roots
    pub fn new(system: &'a dyn System, resolver: &'a Resolver) -> Self {
        Reconciler {
            system,
            resolver,
            provider: None,
        }
    }

    /// Attach the provider used for encrypted entries
    #[must_use]
    pub fn with_provider(mut self, provider: &'a dyn SecretProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub(crate) fn system(&self) -> &'a dyn System {
        self.system
    }

    pub(crate) fn resolver(&self) -> &'a Resolver {
        self.resolver
    }

    pub(crate) fn provider(&self) -> Option<&'a dyn SecretProvider> {
        self.provider
    }

    /// Materialize every entry at its destination
    ///
    /// All paths are resolved before the first write, so one escaping entry
    /// aborts the run with nothing touched. Anything that goes wrong after
    /// that point is confined to its entry.
    pub fn apply(&self, entries: &[&FileEntry], options: ApplyOptions) -> Result<Report> {
        let resolved = self.resolver.resolve_all(entries)?;

        let mut backup = if options.force && options.backup && !options.dry_run {
            Some(BackupSession::create(
                self.resolver.repo(),
                self.resolver.home(),
            )?)
        } else {
            None
        };

        let mut report = Report::new();
        for item in &resolved {
            let outcome = match self.apply_entry(item, options, backup.as_mut()) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(dest = %item.entry.dest, error = %e, "apply failed");
                    Outcome::Failed(e.to_string())
                }
            };
            debug!(dest = %item.entry.dest, outcome = outcome.as_str(), "applied entry");
            report.push(item.entry.dest.clone(), item.entry.kind, outcome);
        }

        report.set_backup_dir(backup.and_then(BackupSession::finish));
        Ok(report)
    }

    fn apply_entry(
        &self,
        item: &ResolvedEntry<'_>,
        options: ApplyOptions,
        backup: Option<&mut BackupSession>,
    ) -> Result<Outcome> {
        let source = &item.source;
        let dest = &item.dest;
        if !self.system.exists(source) && !self.system.is_symlink(source) {
            return Ok(Outcome::Failed(format!(
                "source not found: {}",
                item.entry.source
            )));
        }
        match item.entry.kind {
            EntryKind::Symlink => self.apply_symlink(source, dest, options, backup),
            EntryKind::Copy => self.apply_copy(item.entry, source, dest, options, backup),
            EntryKind::Encrypted => self.apply_encrypted(item.entry, source, dest, options, backup),
        }
    }

    fn apply_symlink(
        &self,
        source: &AbsPath,
        dest: &AbsPath,
        options: ApplyOptions,
        backup: Option<&mut BackupSession>,
    ) -> Result<Outcome> {
        if self.system.exists(dest) || self.system.is_symlink(dest) {
            if self.system.is_symlink(dest) && link_matches(self.system, dest, source)? {
                return Ok(Outcome::Unchanged);
            }
            if !options.force {
                return Ok(Outcome::NeedsForce);
            }
            if let Some(session) = backup {
                session.preserve(dest)?;
            }
            self.remove_existing(dest)?;
            self.place_link(source, dest)?;
            return Ok(Outcome::Replaced);
        }
        self.place_link(source, dest)?;
        Ok(Outcome::Created)
    }

    fn place_link(&self, source: &AbsPath, dest: &AbsPath) -> Result<()> {
        if let Some(parent) = dest.parent() {
            self.system.create_dir_all(&parent)?;
        }
        self.system.symlink(source.as_path(), dest)
    }

    fn apply_copy(
        &self,
        entry: &FileEntry,
        source: &AbsPath,
        dest: &AbsPath,
        options: ApplyOptions,
        backup: Option<&mut BackupSession>,
    ) -> Result<Outcome> {
        let source_is_dir = self.system.metadata(source)?.is_dir();
        if self.system.exists(dest) || self.system.is_symlink(dest) {
            if self.copy_matches(source, dest, source_is_dir)? {
                return Ok(Outcome::Unchanged);
            }
            if !options.force {
                return Ok(Outcome::NeedsForce);
            }
            if let Some(session) = backup {
                session.preserve(dest)?;
            }
            self.remove_existing(dest)?;
            self.write_copy(entry, source, dest, source_is_dir)?;
            return Ok(Outcome::Replaced);
        }
        self.write_copy(entry, source, dest, source_is_dir)?;
        Ok(Outcome::Created)
    }

    fn copy_matches(&self, source: &AbsPath, dest: &AbsPath, source_is_dir: bool) -> Result<bool> {
        // A symlinked destination never counts as a matching copy, even if
        // the content behind it compares equal.
        if self.system.is_symlink(dest) || !self.system.exists(dest) {
            return Ok(false);
        }
        let dest_is_dir = self.system.metadata(dest)?.is_dir();
        match (source_is_dir, dest_is_dir) {
            (true, true) => dirs_equal(self.system, source, dest),
            (false, false) => files_equal(self.system, source, dest),
            _ => Ok(false),
        }
    }

    fn write_copy(
        &self,
        entry: &FileEntry,
        source: &AbsPath,
        dest: &AbsPath,
        source_is_dir: bool,
    ) -> Result<()> {
        if source_is_dir {
            copy_tree(self.system, source, dest, Some(&entry.dest))
        } else {
            let content = self.system.read_file(source)?;
            let mode = dest_mode(self.system, source, &entry.dest);
            self.system.write_file(dest, &content, mode)
        }
    }

    fn apply_encrypted(
        &self,
        entry: &FileEntry,
        source: &AbsPath,
        dest: &AbsPath,
        options: ApplyOptions,
        backup: Option<&mut BackupSession>,
    ) -> Result<Outcome> {
        let Some(provider) = self.provider else {
            return Ok(Outcome::Failed(String::from(
                "no secret provider configured",
            )));
        };
        if self.system.metadata(source)?.is_dir() {
            return Ok(Outcome::Failed(format!(
                "encrypted source is a directory: {}",
                entry.source
            )));
        }
        let plaintext = match provider.decrypt(source) {
            Ok(plaintext) => plaintext,
            Err(e) => return Ok(Outcome::Failed(e.to_string())),
        };

        if self.system.exists(dest) || self.system.is_symlink(dest) {
            if self.plaintext_matches(dest, &plaintext)? {
                return Ok(Outcome::Unchanged);
            }
            if !options.force {
                return Ok(Outcome::NeedsForce);
            }
            if let Some(session) = backup {
                session.preserve(dest)?;
            }
            self.remove_existing(dest)?;
            self.write_plaintext(entry, source, dest, &plaintext)?;
            return Ok(Outcome::Replaced);
        }
        self.write_plaintext(entry, source, dest, &plaintext)?;
        Ok(Outcome::Created)
    }

    fn plaintext_matches(&self, dest: &AbsPath, plaintext: &[u8]) -> Result<bool> {
        if self.system.is_symlink(dest) || !self.system.exists(dest) {
            return Ok(false);
        }
        if self.system.metadata(dest)?.is_dir() {
            return Ok(false);
        }
        Ok(self.system.read_file(dest)? == plaintext)
    }

    fn write_plaintext(
        &self,
        entry: &FileEntry,
        source: &AbsPath,
        dest: &AbsPath,
        plaintext: &[u8],
    ) -> Result<()> {
        let mode = dest_mode(self.system, source, &entry.dest);
        self.system.write_file(dest, plaintext, mode)
    }

    /// Remove whatever sits at `dest`: file, symlink, or directory tree
    pub(crate) fn remove_existing(&self, dest: &AbsPath) -> Result<()> {
        if self.system.is_symlink(dest) {
            return self.system.remove(dest);
        }
        if self.system.metadata(dest)?.is_dir() {
            self.system.remove_all(dest)
        } else {
            self.system.remove(dest)
        }
    }
}

/// Copy every regular file under `from` to the same relative path under `to`
///
/// `dest_rel` is the entry's home-relative destination; when given, files
/// landing on a sensitive path get owner-only permissions.
pub(crate) fn copy_tree(
    system: &dyn System,
    from: &AbsPath,
    to: &AbsPath,
    dest_rel: Option<&RelPath>,
) -> Result<()> {
    for rel in system.walk_files(from)? {
        let source_file = from.join(&rel);
        let content = system.read_file(&source_file)?;
        let mode = match dest_rel {
            Some(base) if is_sensitive(&base.join(&rel)) => Some(0o600),
            _ => file_mode(system, &source_file),
        };
        system.write_file(&to.join(&rel), &content, mode)?;
    }
    Ok(())
}

/// Permission bits for a destination file write
///
/// Sensitive destinations always land owner-only; everything else keeps the
/// source file's bits.
fn dest_mode(system: &dyn System, source: &AbsPath, dest: &RelPath) -> Option<u32> {
    if is_sensitive(dest) {
        return Some(0o600);
    }
    file_mode(system, source)
}

#[cfg(unix)]
pub(crate) fn file_mode(system: &dyn System, path: &AbsPath) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    system
        .metadata(path)
        .ok()
        .map(|m| m.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
pub(crate) fn file_mode(_system: &dyn System, _path: &AbsPath) -> Option<u32> {
    None
}
