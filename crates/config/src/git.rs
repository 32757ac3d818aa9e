//! Repository version-control summary
//!
//! The status and diff commands show where the dotfiles repository stands
//! relative to its upstream. This goes through a small trait so tests can
//! substitute a canned summary, with the real implementation backed by
//! git2 (libgit2); no external git binary is invoked.

use crate::Result;
use std::path::Path;
use tracing::debug;

/// Convert git2 errors to core errors
#[inline]
fn git_err(e: git2::Error) -> roost_core::Error {
    roost_core::Error::Message(format!("Git error: {e}"))
}

/// Snapshot of a repository's version-control state
#[derive(Debug, Clone)]
pub struct VcsSummary {
    /// Current branch name, or a placeholder before the first commit
    pub branch: String,
    /// Commits ahead of upstream, when an upstream is configured
    pub ahead: Option<usize>,
    /// Commits behind upstream, when an upstream is configured
    pub behind: Option<usize>,
    /// Porcelain-style lines for uncommitted changes, `XY path`
    pub changes: Vec<String>,
}

impl VcsSummary {
    /// Whether the working tree has no uncommitted changes
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Source of version-control summaries
pub trait VcsProvider {
    /// Summarize the repository containing `repo`
    ///
    /// Returns `Ok(None)` when the path is not inside a repository at all;
    /// version control is optional for a dotfiles directory.
    fn summary(&self, repo: &Path) -> Result<Option<VcsSummary>>;
}

/// [`VcsProvider`] backed by git2
#[derive(Debug, Default)]
pub struct GitVcs;

impl VcsProvider for GitVcs {
    fn summary(&self, repo: &Path) -> Result<Option<VcsSummary>> {
        let repository = match git2::Repository::discover(repo) {
            Ok(repository) => repository,
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                debug!(path = %repo.display(), "not a git repository");
                return Ok(None);
            }
            Err(e) => return Err(git_err(e)),
        };

        let branch = match repository.head() {
            Ok(head) => head.shorthand().unwrap_or("HEAD").to_string(),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => String::from("(no commits)"),
            Err(e) => return Err(git_err(e)),
        };

        let (ahead, behind) = match ahead_behind(&repository) {
            Some((ahead, behind)) => (Some(ahead), Some(behind)),
            None => (None, None),
        };

        let mut options = git2::StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(false)
            .exclude_submodules(true);
        let statuses = repository.statuses(Some(&mut options)).map_err(git_err)?;
        let changes = statuses
            .iter()
            .filter_map(|entry| {
                let path = entry.path()?;
                Some(format!("{} {path}", status_code(entry.status())))
            })
            .collect();

        Ok(Some(VcsSummary {
            branch,
            ahead,
            behind,
            changes,
        }))
    }
}

fn ahead_behind(repository: &git2::Repository) -> Option<(usize, usize)> {
    let head = repository.head().ok()?;
    let local = head.target()?;
    let branch_name = head.shorthand()?;
    let branch = repository
        .find_branch(branch_name, git2::BranchType::Local)
        .ok()?;
    let upstream = branch.upstream().ok()?;
    let upstream_oid = upstream.get().target()?;
    repository.graph_ahead_behind(local, upstream_oid).ok()
}

fn status_code(status: git2::Status) -> &'static str {
    if status.is_conflicted() {
        "UU"
    } else if status.is_index_new() {
        "A "
    } else if status.is_index_modified() {
        "M "
    } else if status.is_index_deleted() {
        "D "
    } else if status.is_index_renamed() {
        "R "
    } else if status.is_wt_new() {
        "??"
    } else if status.is_wt_modified() {
        " M"
    } else if status.is_wt_deleted() {
        " D"
    } else if status.is_wt_renamed() {
        " R"
    } else {
        "  "
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn plain_directory_is_not_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let summary = GitVcs.summary(dir.path()).unwrap();
        assert!(summary.is_none());
    }

    #[test]
    fn fresh_repository_reports_untracked_files() {
        let dir = tempfile::tempdir().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("manifest.toml"), "[symlinks]\n").unwrap();

        let summary = GitVcs.summary(dir.path()).unwrap().unwrap();

        assert_eq!(summary.branch, "(no commits)");
        assert_eq!(summary.ahead, None);
        assert!(!summary.is_clean());
        assert!(
            summary
                .changes
                .iter()
                .any(|line| line == "?? manifest.toml")
        );
    }

    #[test]
    fn committed_tree_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let repository = git2::Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("manifest.toml"), "[symlinks]\n").unwrap();

        // stage and commit everything
        let mut index = repository.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repository.find_tree(tree_id).unwrap();
        let signature = git2::Signature::now("test", "test@example.com").unwrap();
        repository
            .commit(Some("HEAD"), &signature, &signature, "init", &tree, &[])
            .unwrap();

        let summary = GitVcs.summary(dir.path()).unwrap().unwrap();

        assert!(summary.is_clean());
        assert_ne!(summary.branch, "(no commits)");
        // no upstream configured
        assert_eq!(summary.ahead, None);
        assert_eq!(summary.behind, None);
    }
}
