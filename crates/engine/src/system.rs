//! System abstraction for filesystem operations
//!
//! Every mutation the engine performs goes through the [`System`] trait, so
//! the same classification code runs live, under test, and in dry-run mode:
//! - `RealSystem`: actual filesystem operations
//! - `DryRunSystem`: forwards reads to a wrapped system and records writes
//!   without executing them

use crate::error::{Error, Result};
use roost_core::{AbsPath, RelPath};
use std::cell::RefCell;
use std::fs::{self, Metadata};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Abstraction over filesystem operations
pub trait System {
    /// Read a file's contents, following symlinks
    fn read_file(&self, path: &AbsPath) -> Result<Vec<u8>>;

    /// Write a file's contents with optional permissions
    ///
    /// The write is atomic: content goes to a temporary file next to `path`,
    /// permissions are set on the temporary file, and a rename publishes
    /// both at once. Parent directories are created as needed.
    fn write_file(&self, path: &AbsPath, content: &[u8], mode: Option<u32>) -> Result<()>;

    /// Create a directory and all missing parents
    fn create_dir_all(&self, path: &AbsPath) -> Result<()>;

    /// Remove a file, symlink, or empty directory
    fn remove(&self, path: &AbsPath) -> Result<()>;

    /// Remove a directory and all its contents
    fn remove_all(&self, path: &AbsPath) -> Result<()>;

    /// Check if a path exists, following symlinks
    fn exists(&self, path: &AbsPath) -> bool;

    /// Check if a path is itself a symlink, dangling ones included
    fn is_symlink(&self, path: &AbsPath) -> bool;

    /// Get file metadata, following symlinks
    fn metadata(&self, path: &AbsPath) -> Result<Metadata>;

    /// Create a symbolic link at `link` pointing to `target`
    fn symlink(&self, target: &Path, link: &AbsPath) -> Result<()>;

    /// Read the immediate target of a symlink, without resolving chains
    fn read_link(&self, path: &AbsPath) -> Result<PathBuf>;

    /// Relative paths of all regular files under `root`, sorted
    fn walk_files(&self, root: &AbsPath) -> Result<Vec<RelPath>>;
}

/// Real filesystem implementation
#[derive(Debug, Default)]
pub struct RealSystem;

impl System for RealSystem {
    fn read_file(&self, path: &AbsPath) -> Result<Vec<u8>> {
        fs::read(path.as_path()).map_err(|e| Error::FileRead {
            path: path.clone(),
            source: e,
        })
    }

    fn write_file(&self, path: &AbsPath, content: &[u8], mode: Option<u32>) -> Result<()> {
        let write_err = |e: std::io::Error| Error::FileWrite {
            path: path.clone(),
            source: e,
        };

        let parent = path.parent().ok_or_else(|| {
            write_err(std::io::Error::other("path has no parent directory"))
        })?;
        self.create_dir_all(&parent)?;

        let mut tmp = NamedTempFile::new_in(parent.as_path()).map_err(write_err)?;
        tmp.write_all(content).map_err(write_err)?;

        #[cfg(unix)]
        if let Some(mode) = mode {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(mode);
            tmp.as_file().set_permissions(permissions).map_err(write_err)?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        tmp.persist(path.as_path()).map_err(|e| Error::FileWrite {
            path: path.clone(),
            source: e.error,
        })?;
        Ok(())
    }

    fn create_dir_all(&self, path: &AbsPath) -> Result<()> {
        fs::create_dir_all(path.as_path()).map_err(|e| Error::DirectoryCreate {
            path: path.clone(),
            source: e,
        })
    }

    fn remove(&self, path: &AbsPath) -> Result<()> {
        // symlink_metadata so a dangling link is still removable
        let metadata = fs::symlink_metadata(path.as_path()).map_err(|e| Error::Metadata {
            path: path.clone(),
            source: e,
        })?;
        if metadata.is_dir() {
            fs::remove_dir(path.as_path()).map_err(Error::Io)
        } else {
            fs::remove_file(path.as_path()).map_err(Error::Io)
        }
    }

    fn remove_all(&self, path: &AbsPath) -> Result<()> {
        fs::remove_dir_all(path.as_path()).map_err(Error::Io)
    }

    fn exists(&self, path: &AbsPath) -> bool {
        path.as_path().exists()
    }

    fn is_symlink(&self, path: &AbsPath) -> bool {
        path.as_path().is_symlink()
    }

    fn metadata(&self, path: &AbsPath) -> Result<Metadata> {
        fs::metadata(path.as_path()).map_err(|e| Error::Metadata {
            path: path.clone(),
            source: e,
        })
    }

    fn symlink(&self, target: &Path, link: &AbsPath) -> Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link.as_path()).map_err(Error::Io)
        }

        #[cfg(windows)]
        {
            if target.is_dir() {
                std::os::windows::fs::symlink_dir(target, link.as_path()).map_err(Error::Io)
            } else {
                std::os::windows::fs::symlink_file(target, link.as_path()).map_err(Error::Io)
            }
        }
    }

    fn read_link(&self, path: &AbsPath) -> Result<PathBuf> {
        fs::read_link(path.as_path()).map_err(Error::Io)
    }

    fn walk_files(&self, root: &AbsPath) -> Result<Vec<RelPath>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root.as_path()) {
            let entry = entry.map_err(|e| Error::DirectoryRead {
                path: root.clone(),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk failed")),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(root.as_path()) else {
                continue;
            };
            if rel.as_os_str().is_empty() {
                continue;
            }
            files.push(RelPath::new(rel.to_path_buf())?);
        }
        files.sort();
        Ok(files)
    }
}

/// An operation a dry run would have performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Write a file
    WriteFile {
        path: AbsPath,
        size: usize,
        mode: Option<u32>,
    },
    /// Create a directory chain
    CreateDirAll { path: AbsPath },
    /// Remove a file or symlink
    Remove { path: AbsPath },
    /// Remove a directory tree
    RemoveAll { path: AbsPath },
    /// Create a symlink
    Symlink { link: AbsPath, target: PathBuf },
}

/// Dry-run system that records operations without executing them
///
/// Reads are forwarded to the wrapped system, so classification during a
/// dry run sees exactly the state a live run would see. Mutations are
/// recorded and swallowed.
pub struct DryRunSystem<'a> {
    inner: &'a dyn System,
    operations: RefCell<Vec<Operation>>,
}

impl<'a> DryRunSystem<'a> {
    /// Wrap a system, usually a [`RealSystem`]
    pub fn new(inner: &'a dyn System) -> Self {
        DryRunSystem {
            inner,
            operations: RefCell::new(Vec::new()),
        }
    }

    /// The operations recorded so far, in order
    pub fn operations(&self) -> Vec<Operation> {
        self.operations.borrow().clone()
    }

    fn record(&self, op: Operation) {
        self.operations.borrow_mut().push(op);
    }
}

impl System for DryRunSystem<'_> {
    fn read_file(&self, path: &AbsPath) -> Result<Vec<u8>> {
        self.inner.read_file(path)
    }

    fn write_file(&self, path: &AbsPath, content: &[u8], mode: Option<u32>) -> Result<()> {
        self.record(Operation::WriteFile {
            path: path.clone(),
            size: content.len(),
            mode,
        });
        Ok(())
    }

    fn create_dir_all(&self, path: &AbsPath) -> Result<()> {
        self.record(Operation::CreateDirAll { path: path.clone() });
        Ok(())
    }

    fn remove(&self, path: &AbsPath) -> Result<()> {
        self.record(Operation::Remove { path: path.clone() });
        Ok(())
    }

    fn remove_all(&self, path: &AbsPath) -> Result<()> {
        self.record(Operation::RemoveAll { path: path.clone() });
        Ok(())
    }

    fn exists(&self, path: &AbsPath) -> bool {
        self.inner.exists(path)
    }

    fn is_symlink(&self, path: &AbsPath) -> bool {
        self.inner.is_symlink(path)
    }

    fn metadata(&self, path: &AbsPath) -> Result<Metadata> {
        self.inner.metadata(path)
    }

    fn symlink(&self, target: &Path, link: &AbsPath) -> Result<()> {
        self.record(Operation::Symlink {
            link: link.clone(),
            target: target.to_path_buf(),
        });
        Ok(())
    }

    fn read_link(&self, path: &AbsPath) -> Result<PathBuf> {
        self.inner.read_link(path)
    }

    fn walk_files(&self, root: &AbsPath) -> Result<Vec<RelPath>> {
        self.inner.walk_files(root)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn abs(base: &Path, tail: &str) -> AbsPath {
        AbsPath::from_path(&base.join(tail)).unwrap()
    }

    #[test]
    fn write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = abs(dir.path(), "a/b/c.txt");

        RealSystem.write_file(&path, b"hello", None).unwrap();

        assert_eq!(fs::read(path.as_path()).unwrap(), b"hello");
    }

    #[test]
    fn write_file_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = abs(dir.path(), "file.txt");

        RealSystem.write_file(&path, b"one", None).unwrap();
        RealSystem.write_file(&path, b"two", None).unwrap();

        assert_eq!(fs::read(path.as_path()).unwrap(), b"two");
    }

    #[cfg(unix)]
    #[test]
    fn write_file_applies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = abs(dir.path(), "secret");

        RealSystem.write_file(&path, b"x", Some(0o600)).unwrap();

        let mode = fs::metadata(path.as_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn remove_handles_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let link = abs(dir.path(), "dangling");
        RealSystem
            .symlink(Path::new("/nonexistent/target"), &link)
            .unwrap();
        assert!(RealSystem.is_symlink(&link));

        RealSystem.remove(&link).unwrap();

        assert!(!RealSystem.is_symlink(&link));
    }

    #[test]
    fn walk_files_is_sorted_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let root = AbsPath::from_path(dir.path()).unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/inner.txt"), "i").unwrap();
        fs::write(dir.path().join("top.txt"), "t").unwrap();

        let files = RealSystem.walk_files(&root).unwrap();

        let names: Vec<String> = files.iter().map(RelPath::to_slash_string).collect();
        assert_eq!(names, vec!["sub/inner.txt", "top.txt"]);
    }

    #[test]
    fn dry_run_forwards_reads_and_swallows_writes() {
        let dir = tempfile::tempdir().unwrap();
        let existing = abs(dir.path(), "existing.txt");
        fs::write(existing.as_path(), b"real content").unwrap();

        let real = RealSystem;
        let dry = DryRunSystem::new(&real);

        // reads see the real filesystem
        assert_eq!(dry.read_file(&existing).unwrap(), b"real content");
        assert!(dry.exists(&existing));

        // writes are recorded, not executed
        let target = abs(dir.path(), "new.txt");
        dry.write_file(&target, b"pending", Some(0o600)).unwrap();
        dry.remove(&existing).unwrap();

        assert!(!target.as_path().exists());
        assert!(existing.as_path().exists());
        assert_eq!(
            dry.operations(),
            vec![
                Operation::WriteFile {
                    path: target,
                    size: 7,
                    mode: Some(0o600),
                },
                Operation::Remove { path: existing },
            ]
        );
    }
}
