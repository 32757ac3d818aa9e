//! Content comparison helpers
//!
//! Change detection goes through a cheap size comparison first and only
//! hashes content when the sizes match. Directory entries compare their
//! recursive file sets, then each file pairwise.

use crate::error::Result;
use crate::system::System;
use roost_core::AbsPath;
use sha2::{Digest, Sha256};

/// SHA-256 digest of a byte slice
pub fn hash_data(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Whether content looks binary
///
/// Probes the first 8 KiB for a NUL byte.
pub fn is_binary(data: &[u8]) -> bool {
    data[..data.len().min(8192)].contains(&0)
}

/// Compare two files by content
pub fn files_equal(system: &dyn System, a: &AbsPath, b: &AbsPath) -> Result<bool> {
    if system.metadata(a)?.len() != system.metadata(b)?.len() {
        return Ok(false);
    }
    let content_a = system.read_file(a)?;
    let content_b = system.read_file(b)?;
    Ok(hash_data(&content_a) == hash_data(&content_b))
}

/// Compare two directory trees: same file set, same content per file
pub fn dirs_equal(system: &dyn System, a: &AbsPath, b: &AbsPath) -> Result<bool> {
    let files_a = system.walk_files(a)?;
    let files_b = system.walk_files(b)?;
    if files_a != files_b {
        return Ok(false);
    }
    for rel in &files_a {
        if !files_equal(system, &a.join(rel), &b.join(rel))? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::system::RealSystem;
    use std::fs;

    fn abs(base: &std::path::Path, tail: &str) -> AbsPath {
        AbsPath::from_path(&base.join(tail)).unwrap()
    }

    #[test]
    fn hash_is_stable_and_content_sensitive() {
        assert_eq!(hash_data(b"abc"), hash_data(b"abc"));
        assert_ne!(hash_data(b"abc"), hash_data(b"abd"));
    }

    #[test]
    fn detects_binary_content() {
        assert!(is_binary(b"\x00\x01\x02"));
        assert!(!is_binary(b"plain text\n"));
        assert!(!is_binary(b""));
    }

    #[test]
    fn files_equal_compares_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = abs(dir.path(), "a");
        let b = abs(dir.path(), "b");
        let c = abs(dir.path(), "c");
        fs::write(a.as_path(), "same").unwrap();
        fs::write(b.as_path(), "same").unwrap();
        fs::write(c.as_path(), "diff").unwrap();

        assert!(files_equal(&RealSystem, &a, &b).unwrap());
        assert!(!files_equal(&RealSystem, &a, &c).unwrap());
    }

    #[test]
    fn dirs_equal_compares_file_sets_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = abs(dir.path(), "a");
        let b = abs(dir.path(), "b");
        for root in [&a, &b] {
            fs::create_dir_all(root.as_path().join("nested")).unwrap();
            fs::write(root.as_path().join("one.txt"), "1").unwrap();
            fs::write(root.as_path().join("nested/two.txt"), "2").unwrap();
        }
        assert!(dirs_equal(&RealSystem, &a, &b).unwrap());

        // diverge content
        fs::write(b.as_path().join("one.txt"), "x").unwrap();
        assert!(!dirs_equal(&RealSystem, &a, &b).unwrap());

        // diverge file set
        fs::write(b.as_path().join("one.txt"), "1").unwrap();
        fs::write(b.as_path().join("extra.txt"), "e").unwrap();
        assert!(!dirs_equal(&RealSystem, &a, &b).unwrap());
    }
}
