//! Entry path resolution
//!
//! Manifest entries store repository-relative sources and home-relative
//! destinations. The resolver turns them into absolute paths, normalizes
//! `.` and `..` components lexically, and rejects any entry whose resolved
//! path leaves its root. Nothing here touches the filesystem, so containment
//! is decided before anything exists on disk.

use crate::error::Result;
use roost_core::{AbsPath, Error as CoreError};
use roost_manifest::FileEntry;

/// Turns manifest entries into absolute source and destination paths
#[derive(Debug, Clone)]
pub struct Resolver {
    repo: AbsPath,
    home: AbsPath,
}

/// A manifest entry with its paths resolved against the roots
#[derive(Debug)]
pub struct ResolvedEntry<'a> {
    /// The manifest entry being reconciled
    pub entry: &'a FileEntry,
    /// Absolute path of the tracked source inside the repository
    pub source: AbsPath,
    /// Absolute path the entry materializes at under home
    pub dest: AbsPath,
}

impl Resolver {
    /// Create a resolver for a repository root and a home root
    pub fn new(repo: AbsPath, home: AbsPath) -> Self {
        Resolver {
            repo: repo.normalized(),
            home: home.normalized(),
        }
    }

    /// The repository root
    pub fn repo(&self) -> &AbsPath {
        &self.repo
    }

    /// The home root entries materialize under
    pub fn home(&self) -> &AbsPath {
        &self.home
    }

    /// Absolute, normalized source path for an entry
    pub fn source_path(&self, entry: &FileEntry) -> Result<AbsPath> {
        contain(self.repo.join(&entry.source), &self.repo)
    }

    /// Absolute, normalized destination path for an entry
    pub fn dest_path(&self, entry: &FileEntry) -> Result<AbsPath> {
        contain(self.home.join(&entry.dest), &self.home)
    }

    /// Resolve both paths of a single entry
    pub fn resolve<'a>(&self, entry: &'a FileEntry) -> Result<ResolvedEntry<'a>> {
        Ok(ResolvedEntry {
            entry,
            source: self.source_path(entry)?,
            dest: self.dest_path(entry)?,
        })
    }

    /// Resolve every entry up front
    ///
    /// Runs before the first mutation of an apply or collect, so a single
    /// escaping path aborts the whole run instead of failing halfway
    /// through.
    pub fn resolve_all<'a>(&self, entries: &[&'a FileEntry]) -> Result<Vec<ResolvedEntry<'a>>> {
        entries.iter().map(|entry| self.resolve(entry)).collect()
    }
}

fn contain(path: AbsPath, root: &AbsPath) -> Result<AbsPath> {
    let normalized = path.normalized();
    if normalized.starts_with(root) {
        Ok(normalized)
    } else {
        Err(CoreError::PathEscape {
            path: path.into_path_buf(),
            root: root.as_path().to_path_buf(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use roost_core::RelPath;
    use roost_manifest::EntryKind;

    fn resolver() -> Resolver {
        Resolver::new(
            AbsPath::new("/repo".into()).unwrap(),
            AbsPath::new("/home/user".into()).unwrap(),
        )
    }

    fn entry(source: &str, dest: &str) -> FileEntry {
        FileEntry::new(
            RelPath::from_str_path(source).unwrap(),
            RelPath::from_str_path(dest).unwrap(),
            EntryKind::Symlink,
        )
    }

    #[test]
    fn resolves_against_both_roots() {
        let entry = entry("files/bashrc", ".bashrc");
        let resolved = resolver().resolve(&entry).unwrap();
        assert_eq!(resolved.source.as_path(), std::path::Path::new("/repo/files/bashrc"));
        assert_eq!(
            resolved.dest.as_path(),
            std::path::Path::new("/home/user/.bashrc")
        );
    }

    #[test]
    fn inner_dot_dot_stays_contained() {
        let entry = entry("files/nvim/../helix/config.toml", ".config/a/../helix");
        let resolved = resolver().resolve(&entry).unwrap();
        assert_eq!(
            resolved.source.as_path(),
            std::path::Path::new("/repo/files/helix/config.toml")
        );
        assert_eq!(
            resolved.dest.as_path(),
            std::path::Path::new("/home/user/.config/helix")
        );
    }

    #[test]
    fn escaping_source_is_rejected() {
        let err = resolver()
            .source_path(&entry("../outside", ".bashrc"))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Core(CoreError::PathEscape { .. })
        ));
    }

    #[test]
    fn escaping_dest_is_rejected() {
        let err = resolver()
            .dest_path(&entry("files/passwd", "../../etc/passwd"))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Core(CoreError::PathEscape { .. })
        ));
    }

    #[test]
    fn resolve_all_fails_on_first_escape() {
        let good = entry("files/bashrc", ".bashrc");
        let evil = entry("files/evil", "../../etc/evil");
        let entries = [&good, &evil];
        assert!(resolver().resolve_all(&entries).is_err());
    }
}
