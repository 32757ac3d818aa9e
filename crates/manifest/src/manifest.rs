//! Loading, mutation and persistence of the manifest file

use crate::entry::{FileEntry, platforms_overlap};
use crate::error::{Error, Result};
use crate::format::Document;
use roost_core::{AbsPath, Platform, RelPath};
use std::io::Write;
use tracing::debug;

/// The set of managed files, bound to the manifest file it came from
#[derive(Debug)]
pub struct Manifest {
    path: AbsPath,
    entries: Vec<FileEntry>,
}

impl Manifest {
    /// Create an empty manifest that will persist to `path`
    pub fn new(path: AbsPath) -> Self {
        Manifest {
            path,
            entries: Vec::new(),
        }
    }

    /// Load the manifest from `path`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the file does not exist,
    /// [`Error::Parse`] if it is not a valid manifest document, and
    /// [`Error::InvalidEntry`] if an entry carries an unusable path.
    pub fn load(path: &AbsPath) -> Result<Self> {
        let text = match std::fs::read_to_string(path.as_path()) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound {
                    path: path.as_path().to_path_buf(),
                });
            }
            Err(e) => {
                return Err(Error::Io {
                    path: path.as_path().to_path_buf(),
                    source: e,
                });
            }
        };

        let doc: Document = toml::from_str(&text).map_err(|e| Error::Parse {
            path: path.as_path().to_path_buf(),
            source: Box::new(e),
        })?;
        let entries = doc.into_entries()?;
        debug!(path = %path, entries = entries.len(), "loaded manifest");

        Ok(Manifest {
            path: path.clone(),
            entries,
        })
    }

    /// Load the manifest, treating a missing file as empty
    ///
    /// `add` uses this so tracking the first file also creates the manifest.
    pub fn load_or_default(path: &AbsPath) -> Result<Self> {
        match Self::load(path) {
            Err(Error::NotFound { .. }) => Ok(Self::new(path.clone())),
            other => other,
        }
    }

    /// Write the manifest back to its file
    ///
    /// The write is atomic: content goes to a temporary file in the same
    /// directory which is then renamed over the destination. Saving the
    /// entries of a file roost wrote reproduces it byte for byte.
    pub fn save(&self) -> Result<()> {
        let doc = Document::from_entries(&self.entries);
        let text = toml::to_string(&doc)?;

        let io_err = |source: std::io::Error| Error::Io {
            path: self.path.as_path().to_path_buf(),
            source,
        };
        let parent = self.path.parent().ok_or_else(|| {
            io_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "manifest path has no parent directory",
            ))
        })?;
        std::fs::create_dir_all(parent.as_path()).map_err(io_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent.as_path()).map_err(io_err)?;
        tmp.write_all(text.as_bytes()).map_err(io_err)?;
        tmp.persist(self.path.as_path())
            .map_err(|e| io_err(e.error))?;

        debug!(path = %self.path, entries = self.entries.len(), "saved manifest");
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &AbsPath {
        &self.path
    }

    /// All entries in document order
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest tracks nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry and persist
    ///
    /// # Errors
    ///
    /// Returns [`Error::Duplicate`] if the destination is already tracked by
    /// an entry whose platform qualifier overlaps the new one. An entry for
    /// `darwin` and an entry for `linux` may share a destination; an
    /// unqualified entry excludes every qualifier.
    pub fn add(&mut self, entry: FileEntry) -> Result<()> {
        if let Some(existing) = self.conflict_with(&entry.dest, entry.platform) {
            return Err(Error::Duplicate {
                dest: existing.dest.clone(),
                platform: existing.platform,
            });
        }
        self.entries.push(entry);
        self.save()
    }

    /// Remove the entry for `dest` with exactly the given qualifier
    ///
    /// Returns `false` if no such entry exists; the manifest is only written
    /// when something was removed.
    pub fn remove(&mut self, dest: &RelPath, platform: Option<Platform>) -> Result<bool> {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.dest == *dest && e.platform == platform));
        if self.entries.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// First entry tracking `dest`, on any platform
    pub fn find_by_dest(&self, dest: &RelPath) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.dest == *dest)
    }

    /// Entries that participate in reconciliation on `platform`
    pub fn for_platform(&self, platform: Platform) -> Vec<&FileEntry> {
        self.entries
            .iter()
            .filter(|e| e.active_on(platform))
            .collect()
    }

    /// Promote copies whose source the predicate marks as encrypted
    ///
    /// Encryption is configured outside the manifest, so this runs after
    /// loading. The promotion is a derived view; encrypted entries persist
    /// as plain copies.
    pub fn classify<F>(&mut self, is_encrypted: F)
    where
        F: Fn(&RelPath) -> bool,
    {
        for entry in &mut self.entries {
            if entry.kind == crate::entry::EntryKind::Copy && is_encrypted(&entry.source) {
                entry.kind = crate::entry::EntryKind::Encrypted;
            }
        }
    }

    fn conflict_with(&self, dest: &RelPath, platform: Option<Platform>) -> Option<&FileEntry> {
        self.entries
            .iter()
            .find(|e| e.dest == *dest && platforms_overlap(e.platform, platform))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::entry::EntryKind;

    fn rel(s: &str) -> RelPath {
        RelPath::new(s.into()).unwrap()
    }

    fn manifest_in(dir: &tempfile::TempDir) -> Manifest {
        let path = AbsPath::from_path(&dir.path().join("manifest.toml")).unwrap();
        Manifest::new(path)
    }

    #[test]
    fn add_then_reload_preserves_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = manifest_in(&dir);
        manifest
            .add(FileEntry::new(rel("files/fish"), rel(".config/fish"), EntryKind::Symlink))
            .unwrap();
        manifest
            .add(FileEntry::new(rel("files/gitconfig"), rel(".gitconfig"), EntryKind::Copy))
            .unwrap();

        let reloaded = Manifest::load(manifest.path()).unwrap();
        assert_eq!(reloaded.entries(), manifest.entries());
    }

    #[test]
    fn duplicate_dest_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = manifest_in(&dir);
        manifest
            .add(FileEntry::new(rel("files/a"), rel(".zshrc"), EntryKind::Symlink))
            .unwrap();

        let err = manifest
            .add(FileEntry::new(rel("files/b"), rel(".zshrc"), EntryKind::Copy))
            .unwrap_err();
        assert!(matches!(err, Error::Duplicate { .. }));
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn same_dest_on_disjoint_platforms_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = manifest_in(&dir);
        manifest
            .add(
                FileEntry::new(rel("files/alacritty-mac"), rel(".config/alacritty"), EntryKind::Symlink)
                    .with_platform(Some(Platform::Darwin)),
            )
            .unwrap();
        manifest
            .add(
                FileEntry::new(rel("files/alacritty-linux"), rel(".config/alacritty"), EntryKind::Symlink)
                    .with_platform(Some(Platform::Linux)),
            )
            .unwrap();
        assert_eq!(manifest.len(), 2);

        // An unqualified entry overlaps both existing qualifiers.
        let err = manifest
            .add(FileEntry::new(rel("files/alacritty"), rel(".config/alacritty"), EntryKind::Symlink))
            .unwrap_err();
        assert!(matches!(err, Error::Duplicate { .. }));
    }

    #[test]
    fn remove_matches_the_exact_qualifier() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = manifest_in(&dir);
        manifest
            .add(
                FileEntry::new(rel("files/brew"), rel(".Brewfile"), EntryKind::Copy)
                    .with_platform(Some(Platform::Darwin)),
            )
            .unwrap();

        assert!(!manifest.remove(&rel(".Brewfile"), None).unwrap());
        assert!(manifest.remove(&rel(".Brewfile"), Some(Platform::Darwin)).unwrap());
        assert!(manifest.is_empty());
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = AbsPath::from_path(&dir.path().join("manifest.toml")).unwrap();
        assert!(matches!(Manifest::load(&path), Err(Error::NotFound { .. })));
        let manifest = Manifest::load_or_default(&path).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn for_platform_keeps_document_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = manifest_in(&dir);
        manifest
            .add(FileEntry::new(rel("files/a"), rel(".a"), EntryKind::Symlink))
            .unwrap();
        manifest
            .add(
                FileEntry::new(rel("files/b"), rel(".b"), EntryKind::Symlink)
                    .with_platform(Some(Platform::Windows)),
            )
            .unwrap();
        manifest
            .add(FileEntry::new(rel("files/c"), rel(".c"), EntryKind::Copy))
            .unwrap();

        let linux: Vec<_> = manifest
            .for_platform(Platform::Linux)
            .into_iter()
            .map(|e| e.dest.to_slash_string())
            .collect();
        assert_eq!(linux, vec![".a", ".c"]);
    }

    #[test]
    fn classify_promotes_matching_copies_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = manifest_in(&dir);
        manifest
            .add(FileEntry::new(rel("secrets/token"), rel(".config/hub"), EntryKind::Copy))
            .unwrap();
        manifest
            .add(FileEntry::new(rel("files/gitconfig"), rel(".gitconfig"), EntryKind::Copy))
            .unwrap();
        manifest
            .add(FileEntry::new(rel("secrets/link"), rel(".netrc-link"), EntryKind::Symlink))
            .unwrap();

        manifest.classify(|source| source.as_path().starts_with("secrets"));

        assert_eq!(manifest.entries()[0].kind, EntryKind::Encrypted);
        assert_eq!(manifest.entries()[1].kind, EntryKind::Copy);
        // Symlinks never decrypt; classification leaves them alone.
        assert_eq!(manifest.entries()[2].kind, EntryKind::Symlink);
    }
}
