//! Pre-apply backups of displaced files
//!
//! A forced apply may replace files the user still cares about. Before each
//! destructive replacement the displaced file or tree is copied under
//! `<repo>/.roost/backups/pre-apply-<timestamp>/<dest>`. Displaced symlinks
//! are not copied through; a `<name>.symlink` text file records the old
//! target instead.

use crate::error::{Error, Result};
use roost_core::{AbsPath, RelPath};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Collects displaced files during one forced apply run
///
/// Only ever constructed for live runs; dry runs never create one, so the
/// backup directory itself is proof that something was (or was about to be)
/// replaced.
pub struct BackupSession {
    root: AbsPath,
    home: AbsPath,
    stored: usize,
}

impl BackupSession {
    /// Create the backup directory for a run starting now
    pub fn create(repo: &AbsPath, home: &AbsPath) -> Result<Self> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let root = AbsPath::from_path(
            &repo
                .as_path()
                .join(".roost")
                .join("backups")
                .join(format!("pre-apply-{stamp}")),
        )?;
        fs::create_dir_all(root.as_path()).map_err(|e| Error::Backup {
            path: root.clone(),
            source: e,
        })?;
        debug!(backup = %root, "created backup directory");
        Ok(BackupSession {
            root,
            home: home.clone(),
            stored: 0,
        })
    }

    /// Directory backups for this run land under
    pub fn root(&self) -> &AbsPath {
        &self.root
    }

    /// Preserve whatever currently sits at `dest` before it is replaced
    pub fn preserve(&mut self, dest: &AbsPath) -> Result<()> {
        let backup_err = |e: std::io::Error| Error::Backup {
            path: dest.clone(),
            source: e,
        };

        let rel = match dest.strip_prefix(&self.home) {
            Ok(rel) => rel.into_path_buf(),
            // Destinations outside home keep only their file name.
            Err(_) => PathBuf::from(dest.file_name().unwrap_or("displaced")),
        };
        let target = self.root.as_path().join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(backup_err)?;
        }

        let metadata = match fs::symlink_metadata(dest.as_path()) {
            Ok(metadata) => metadata,
            // Nothing on disk, nothing to preserve.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(backup_err(e)),
        };

        if metadata.is_symlink() {
            let old_target = fs::read_link(dest.as_path())
                .map(|t| t.display().to_string())
                .unwrap_or_else(|_| String::from("broken"));
            let marker = match target.file_name().and_then(|n| n.to_str()) {
                Some(name) => target.with_file_name(format!("{name}.symlink")),
                None => target.clone(),
            };
            fs::write(&marker, old_target).map_err(backup_err)?;
        } else if metadata.is_dir() {
            copy_dir(dest, &target)?;
        } else {
            fs::copy(dest.as_path(), &target).map_err(backup_err)?;
        }

        self.stored += 1;
        debug!(dest = %dest, "preserved displaced file");
        Ok(())
    }

    /// Finish the session
    ///
    /// Returns the backup root when at least one displaced file was
    /// preserved; an empty directory is removed and `None` returned.
    pub fn finish(self) -> Option<AbsPath> {
        if self.stored == 0 {
            fs::remove_dir(self.root.as_path()).ok();
            return None;
        }
        Some(self.root)
    }
}

fn copy_dir(from: &AbsPath, to: &Path) -> Result<()> {
    let backup_err = |e: std::io::Error| Error::Backup {
        path: from.clone(),
        source: e,
    };
    for entry in WalkDir::new(from.as_path()) {
        let entry = entry.map_err(|e| {
            backup_err(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk failed")),
            )
        })?;
        let Ok(rel) = entry.path().strip_prefix(from.as_path()) else {
            continue;
        };
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(backup_err)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(backup_err)?;
            }
            fs::copy(entry.path(), &target).map_err(backup_err)?;
        }
        // Symlinks inside a displaced tree are dropped; the tree copy is a
        // safety net, not an archival mirror.
    }
    Ok(())
}
