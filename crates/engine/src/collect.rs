//! Reverse reconciliation: gather destination edits back into the repository
//!
//! Collect is the inverse of apply for copy and encrypted entries. Symlink
//! destinations share storage with their source, so there is never anything
//! of their own to gather and they are skipped.

use crate::apply::{Reconciler, copy_tree, file_mode};
use crate::content::{dirs_equal, files_equal};
use crate::error::Result;
use crate::outcome::Outcome;
use crate::report::Report;
use crate::resolve::ResolvedEntry;
use crate::system::System;
use roost_core::{AbsPath, RelPath};
use roost_manifest::{EntryKind, FileEntry};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Options controlling a collect run
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectOptions {
    /// Classify without mutating; the provider is never asked to re-encrypt
    pub dry_run: bool,
}

impl Reconciler<'_> {
    /// Copy destination edits back over their sources
    ///
    /// Entries are resolved up front and processed in manifest order, with
    /// the same per-entry failure isolation as apply.
    pub fn collect(&self, entries: &[&FileEntry], options: CollectOptions) -> Result<Report> {
        let resolved = self.resolver().resolve_all(entries)?;
        let mut report = Report::new();
        for item in &resolved {
            let outcome = match self.collect_entry(item, options) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(dest = %item.entry.dest, error = %e, "collect failed");
                    Outcome::Failed(e.to_string())
                }
            };
            debug!(dest = %item.entry.dest, outcome = outcome.as_str(), "collected entry");
            report.push(item.entry.dest.clone(), item.entry.kind, outcome);
        }
        Ok(report)
    }

    fn collect_entry(
        &self,
        item: &ResolvedEntry<'_>,
        options: CollectOptions,
    ) -> Result<Outcome> {
        let source = &item.source;
        let dest = &item.dest;
        if !item.entry.kind.is_collectable() {
            return Ok(Outcome::Skipped);
        }
        if !self.system().exists(dest) {
            return Ok(Outcome::Skipped);
        }
        // A symlinked destination already writes through to the repository.
        if self.system().is_symlink(dest) {
            return Ok(Outcome::Skipped);
        }
        match item.entry.kind {
            EntryKind::Copy => self.collect_copy(source, dest),
            EntryKind::Encrypted => self.collect_encrypted(source, dest, options),
            EntryKind::Symlink => Ok(Outcome::Skipped),
        }
    }

    fn collect_copy(&self, source: &AbsPath, dest: &AbsPath) -> Result<Outcome> {
        let system = self.system();
        let dest_is_dir = system.metadata(dest)?.is_dir();
        let source_present = system.exists(source);
        let source_is_dir = source_present && system.metadata(source)?.is_dir();

        if source_present {
            let equal = match (dest_is_dir, source_is_dir) {
                (true, true) => dirs_equal(system, dest, source)?,
                (false, false) => files_equal(system, dest, source)?,
                _ => false,
            };
            if equal {
                return Ok(Outcome::Unchanged);
            }
        }

        if dest_is_dir {
            if source_present {
                self.remove_existing(source)?;
            }
            copy_tree(system, dest, source, None)?;
        } else {
            if source_is_dir {
                self.remove_existing(source)?;
            }
            let content = system.read_file(dest)?;
            system.write_file(source, &content, file_mode(system, dest))?;
        }
        Ok(Outcome::Collected)
    }

    fn collect_encrypted(
        &self,
        source: &AbsPath,
        dest: &AbsPath,
        options: CollectOptions,
    ) -> Result<Outcome> {
        let Some(provider) = self.provider() else {
            return Ok(Outcome::Failed(String::from(
                "no secret provider configured",
            )));
        };
        let system = self.system();
        if system.metadata(dest)?.is_dir() {
            return Ok(Outcome::Failed(String::from(
                "encrypted destination is a directory",
            )));
        }
        let dest_content = system.read_file(dest)?;

        if system.exists(source) {
            match provider.decrypt(source) {
                Ok(plaintext) if plaintext == dest_content => return Ok(Outcome::Unchanged),
                Ok(_) => {}
                Err(e) => return Ok(Outcome::Failed(e.to_string())),
            }
        }

        // The provider writes ciphertext itself; a dry run never invokes it.
        if options.dry_run {
            return Ok(Outcome::Collected);
        }
        match provider.encrypt(&dest_content, source) {
            Ok(()) => Ok(Outcome::Collected),
            Err(e) => Ok(Outcome::Failed(e.to_string())),
        }
    }
}

/// Well-known dotfile locations probed by the import scan
pub const COMMON_DOTFILES: &[&str] = &[
    ".bashrc",
    ".bash_profile",
    ".zshrc",
    ".zprofile",
    ".profile",
    ".gitconfig",
    ".gitignore_global",
    ".vimrc",
    ".tmux.conf",
    ".inputrc",
    ".editorconfig",
    ".npmrc",
    ".yarnrc",
    ".gemrc",
    ".config/fish",
    ".config/nvim",
    ".config/helix",
    ".config/starship.toml",
    ".config/kitty",
    ".config/alacritty",
    ".config/wezterm",
    ".config/ghostty",
    ".config/tmux",
    ".config/yazi",
    ".config/zellij",
    ".config/atuin",
    ".config/bat",
    ".config/lazygit",
    ".config/gh",
    ".ssh/config",
];

/// A file under home that looks worth tracking
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Home-relative path of the file or directory
    pub dest: RelPath,
    /// Whether the candidate is a directory
    pub is_dir: bool,
    /// Size in bytes, summed recursively for directories
    pub size: u64,
}

/// Scan home for well-known dotfiles that are not tracked yet
///
/// Probes [`COMMON_DOTFILES`] in order, dropping anything already in the
/// manifest and any symlink that points into the repository. Purely a
/// report; nothing is ever added to the manifest here.
pub fn scan_candidates(
    system: &dyn System,
    home: &AbsPath,
    repo: &AbsPath,
    tracked: &[FileEntry],
) -> Vec<Candidate> {
    let tracked_dests: HashSet<&RelPath> = tracked.iter().map(|entry| &entry.dest).collect();
    let mut found = Vec::new();
    for name in COMMON_DOTFILES {
        let Ok(dest) = RelPath::from_str_path(name) else {
            continue;
        };
        if tracked_dests.contains(&dest) {
            continue;
        }
        let path = home.join(&dest);
        if !system.exists(&path) {
            continue;
        }
        if system.is_symlink(&path) && links_into(system, &path, repo) {
            continue;
        }
        let Ok(metadata) = system.metadata(&path) else {
            continue;
        };
        let (is_dir, size) = if metadata.is_dir() {
            (true, tree_size(system, &path))
        } else {
            (false, metadata.len())
        };
        found.push(Candidate { dest, is_dir, size });
    }
    found
}

fn links_into(system: &dyn System, path: &AbsPath, repo: &AbsPath) -> bool {
    let Ok(target) = system.read_link(path) else {
        return false;
    };
    let absolute = if target.is_absolute() {
        AbsPath::new(target).ok()
    } else {
        path.parent()
            .and_then(|parent| AbsPath::from_path(&parent.as_path().join(target)).ok())
    };
    absolute.is_some_and(|abs| abs.normalized().starts_with(repo))
}

fn tree_size(system: &dyn System, root: &AbsPath) -> u64 {
    let Ok(files) = system.walk_files(root) else {
        return 0;
    };
    files
        .iter()
        .filter_map(|rel| system.metadata(&root.join(rel)).ok())
        .map(|metadata| metadata.len())
        .sum()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::system::RealSystem;
    use std::fs;

    struct Roots {
        _tmp: tempfile::TempDir,
        repo: AbsPath,
        home: AbsPath,
    }

    fn roots() -> Roots {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().canonicalize().unwrap();
        let repo = AbsPath::from_path(&base.join("repo")).unwrap();
        let home = AbsPath::from_path(&base.join("home")).unwrap();
        fs::create_dir_all(repo.as_path()).unwrap();
        fs::create_dir_all(home.as_path()).unwrap();
        Roots {
            _tmp: tmp,
            repo,
            home,
        }
    }

    fn rel(s: &str) -> RelPath {
        RelPath::from_str_path(s).unwrap()
    }

    #[test]
    fn scan_finds_untracked_files_with_sizes() {
        let roots = roots();
        fs::write(roots.home.as_path().join(".bashrc"), "export A=1\n").unwrap();
        fs::create_dir_all(roots.home.as_path().join(".config/nvim")).unwrap();
        fs::write(roots.home.as_path().join(".config/nvim/init.lua"), "-- hi").unwrap();

        let found = scan_candidates(&RealSystem, &roots.home, &roots.repo, &[]);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].dest, rel(".bashrc"));
        assert!(!found[0].is_dir);
        assert_eq!(found[0].size, 11);
        assert_eq!(found[1].dest, rel(".config/nvim"));
        assert!(found[1].is_dir);
        assert_eq!(found[1].size, 5);
    }

    #[test]
    fn scan_skips_tracked_destinations() {
        let roots = roots();
        fs::write(roots.home.as_path().join(".bashrc"), "x").unwrap();
        let tracked = vec![FileEntry::new(
            rel("files/bashrc"),
            rel(".bashrc"),
            EntryKind::Symlink,
        )];

        let found = scan_candidates(&RealSystem, &roots.home, &roots.repo, &tracked);

        assert!(found.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn scan_skips_symlinks_into_the_repository() {
        let roots = roots();
        fs::write(roots.repo.as_path().join("vimrc"), "set nu").unwrap();
        std::os::unix::fs::symlink(
            roots.repo.as_path().join("vimrc"),
            roots.home.as_path().join(".vimrc"),
        )
        .unwrap();
        // A link elsewhere still shows up.
        fs::write(roots.home.as_path().join("real-zshrc"), "z").unwrap();
        std::os::unix::fs::symlink(
            roots.home.as_path().join("real-zshrc"),
            roots.home.as_path().join(".zshrc"),
        )
        .unwrap();

        let found = scan_candidates(&RealSystem, &roots.home, &roots.repo, &[]);

        let names: Vec<String> = found.iter().map(|c| c.dest.to_slash_string()).collect();
        assert_eq!(names, vec![".zshrc"]);
    }
}
