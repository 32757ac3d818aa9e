//! Add command implementation
//!
//! Bring a file under management: its bytes move into the repository, the
//! manifest gains an entry, and for symlink materialization the original
//! file is replaced by a link to the repository copy.

use clap::{Args, ValueEnum};
use owo_colors::OwoColorize;
use roost_core::{AbsPath, Platform, RelPath};
use roost_engine::{RealSystem, System};
use roost_manifest::{EntryKind, FileEntry};
use roost_vault::SecretProvider;
use std::path::PathBuf;
use tracing::info;

use crate::command::Command;
use crate::common::{self, RuntimeContext};
use crate::error::{CommandError, Result};

/// Materializations `roost add` can record
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AddKind {
    /// Replace the file with a symlink into the repository
    Symlink,
    /// Keep an independent copy at the destination
    Copy,
}

impl From<AddKind> for EntryKind {
    fn from(kind: AddKind) -> Self {
        match kind {
            AddKind::Symlink => EntryKind::Symlink,
            AddKind::Copy => EntryKind::Copy,
        }
    }
}

/// Start tracking a file
#[derive(Debug, Clone, Args)]
pub struct AddCommand {
    /// File or directory to track; must live under the home directory
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// How the destination is materialized
    #[arg(short, long, value_enum, default_value_t = AddKind::Symlink)]
    pub kind: AddKind,

    /// Store the source encrypted (implies copy materialization)
    #[arg(short, long)]
    pub secret: bool,

    /// Restrict the entry to one platform (darwin, linux or windows)
    #[arg(short, long, value_name = "PLATFORM")]
    pub platform: Option<Platform>,
}

impl Command for AddCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let system = RealSystem;
        let target = common::absolutize(&self.file)?;
        if !system.exists(&target) && !system.is_symlink(&target) {
            return Err(CommandError::FileNotFound(self.file.clone()));
        }

        let dest = target.strip_prefix(&context.paths.home).map_err(|_| {
            CommandError::not_under_home(
                target.as_path().to_path_buf(),
                context.paths.home.as_path().to_path_buf(),
            )
        })?;

        let source = derive_source(&dest, self.secret)?;
        let source_abs = context.paths.repo.join(&source);
        let kind = if self.secret {
            EntryKind::Copy
        } else {
            self.kind.into()
        };
        info!(dest = %dest, source = %source, kind = %kind, "tracking file");

        let mut manifest = context.load_manifest_or_default()?;
        materialize_source(&system, context, &target, &source_abs, self.secret)?;
        manifest.add(FileEntry::new(source.clone(), dest.clone(), kind).with_platform(self.platform))?;

        // Only after the repository holds the bytes is the original replaced.
        if kind == EntryKind::Symlink {
            replace_with_link(&system, &target, &source_abs)?;
        }

        if self.secret {
            println!("Stored encrypted under secrets/");
        }
        println!("{}", format!("Added: {source} -> ~/{dest}").green());
        Ok(())
    }
}

/// Where under the repository a newly tracked destination is stored
///
/// Secret adds land in `secrets/`; `.config` trees keep their shape under
/// `files/config/`; other dotfiles go to `files/home/`; everything else to
/// `files/`.
fn derive_source(dest: &RelPath, secret: bool) -> Result<RelPath> {
    let slash = dest.to_slash_string();
    let path = if secret {
        let name = dest
            .file_name()
            .ok_or_else(|| CommandError::FileNotFound(PathBuf::from(slash.clone())))?;
        format!("secrets/{name}")
    } else if let Some(rest) = slash.strip_prefix(".config/") {
        format!("files/config/{rest}")
    } else if slash.starts_with('.') {
        format!("files/home/{slash}")
    } else {
        format!("files/{slash}")
    };
    Ok(RelPath::from_str_path(&path)?)
}

/// Bring the file's bytes into the repository
///
/// An existing source path is overwritten; re-adding a tracked file just
/// refreshes the repository copy.
fn materialize_source(
    system: &RealSystem,
    context: &RuntimeContext,
    target: &AbsPath,
    source_abs: &AbsPath,
    secret: bool,
) -> Result<()> {
    let is_dir = system.metadata(target)?.is_dir();

    if secret {
        if is_dir {
            return Err(CommandError::SecretDirectory(
                target.as_path().to_path_buf(),
            ));
        }
        let provider = context.provider()?.ok_or(CommandError::NoProvider)?;
        let plaintext = system.read_file(target)?;
        provider.encrypt(&plaintext, source_abs)?;
        return Ok(());
    }

    if is_dir {
        if system.exists(source_abs) {
            system.remove_all(source_abs)?;
        }
        for rel in system.walk_files(target)? {
            let from = target.join(&rel);
            let mode = system.metadata(&from).ok().as_ref().and_then(mode_of);
            let content = system.read_file(&from)?;
            system.write_file(&source_abs.join(&rel), &content, mode)?;
        }
    } else {
        let mode = system.metadata(target).ok().as_ref().and_then(mode_of);
        let content = system.read_file(target)?;
        system.write_file(source_abs, &content, mode)?;
    }
    Ok(())
}

fn replace_with_link(system: &RealSystem, target: &AbsPath, source_abs: &AbsPath) -> Result<()> {
    if system.is_symlink(target) || !system.metadata(target)?.is_dir() {
        system.remove(target)?;
    } else {
        system.remove_all(target)?;
    }
    system.symlink(source_abs.as_path(), target)?;
    Ok(())
}

#[cfg(unix)]
fn mode_of(meta: &std::fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn mode_of(_meta: &std::fs::Metadata) -> Option<u32> {
    None
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn rel(s: &str) -> RelPath {
        RelPath::new(s.into()).unwrap()
    }

    #[test]
    fn config_tree_keeps_its_shape() {
        let source = derive_source(&rel(".config/nvim/init.lua"), false).unwrap();
        assert_eq!(source, rel("files/config/nvim/init.lua"));
    }

    #[test]
    fn hidden_home_files_go_to_files_home() {
        let source = derive_source(&rel(".bashrc"), false).unwrap();
        assert_eq!(source, rel("files/home/.bashrc"));
    }

    #[test]
    fn plain_files_go_under_files() {
        let source = derive_source(&rel("bin/backup.sh"), false).unwrap();
        assert_eq!(source, rel("files/bin/backup.sh"));
    }

    #[test]
    fn secrets_flatten_to_their_file_name() {
        let source = derive_source(&rel(".ssh/id_ed25519"), true).unwrap();
        assert_eq!(source, rel("secrets/id_ed25519"));
    }
}
