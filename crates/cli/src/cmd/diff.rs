//! Diff command implementation
//!
//! Summary mode prints the version control short status followed by a
//! per-entry table. `--full` renders unified content diffs of what an
//! apply would change, destination on the left, repository source on the
//! right.

use clap::Args;
use owo_colors::OwoColorize;
use roost_config::{GitVcs, VcsProvider};
use roost_core::RelPath;
use roost_engine::{
    Inspector, RealSystem, ReconcileStatus, ResolvedEntry, StatusReport, System, files_equal,
    is_binary,
};
use roost_manifest::EntryKind;
use similar::TextDiff;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::render;

/// Show entries that differ and why
#[derive(Debug, Clone, Args)]
pub struct DiffCommand {
    /// Show unified content diffs instead of the summary table
    #[arg(short, long)]
    pub full: bool,

    /// Only show entries whose source or destination matches
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl Command for DiffCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let manifest = context.load_manifest()?;
        let active = manifest.for_platform(context.platform);
        let resolver = context.resolver();
        let mut resolved = resolver.resolve_all(&active)?;
        if let Some(filter) = self.file.as_deref() {
            resolved.retain(|item| matches_filter(item, filter));
        }

        let system = RealSystem;
        let provider = context.provider_or_none();
        let mut inspector = Inspector::new(&system);
        if let Some(provider) = provider.as_ref() {
            inspector = inspector.with_provider(provider);
        }

        if self.full {
            print_full(&system, &inspector, &resolved)
        } else {
            print_vcs_lines(context);
            print_summary(&inspector, &resolved);
            Ok(())
        }
    }
}

/// Whether `filter` names this entry by destination or source
///
/// Relative filters also match on trailing components, so
/// `roost diff --full init.lua` works without the full path.
fn matches_filter(item: &ResolvedEntry<'_>, filter: &Path) -> bool {
    if filter.is_absolute() {
        return item.dest.as_path() == filter || item.source.as_path() == filter;
    }
    item.entry.dest.as_path() == filter
        || item.entry.source.as_path() == filter
        || item.entry.dest.as_path().ends_with(filter)
        || item.entry.source.as_path().ends_with(filter)
}

fn print_vcs_lines(context: &RuntimeContext) {
    match GitVcs.summary(context.paths.repo.as_path()) {
        Ok(Some(summary)) => {
            println!("{}", "Repository".bold());
            if summary.changes.is_empty() {
                println!("  {}", "clean - no uncommitted changes".dimmed());
            } else {
                for line in &summary.changes {
                    println!("  {line}");
                }
            }
            println!();
        }
        Ok(None) => debug!("repository is not under version control"),
        Err(e) => debug!("vcs summary unavailable: {e}"),
    }
}

fn print_summary(inspector: &Inspector<'_>, resolved: &[ResolvedEntry<'_>]) {
    if resolved.is_empty() {
        println!("No files in manifest");
        return;
    }
    let report = StatusReport::gather(inspector, resolved);
    let mut table = render::create_table(&["Status", "Type", "Destination"]);
    for row in report.rows() {
        table.add_row(vec![
            render::status_label(row.status),
            row.kind.as_str().to_string(),
            format!("~/{}", row.dest),
        ]);
    }
    println!("{table}");
}

fn print_full(
    system: &RealSystem,
    inspector: &Inspector<'_>,
    resolved: &[ResolvedEntry<'_>],
) -> Result<()> {
    let mut printed = false;
    for item in resolved {
        let status = inspector.status(item);
        if status == ReconcileStatus::Ok {
            continue;
        }
        printed |= print_entry(system, item, status)?;
    }
    if !printed {
        println!("{}", "All files in sync".green());
    }
    Ok(())
}

fn print_entry(
    system: &RealSystem,
    item: &ResolvedEntry<'_>,
    status: ReconcileStatus,
) -> Result<bool> {
    let dest = &item.entry.dest;
    match status {
        ReconcileStatus::Ok => Ok(false),
        ReconcileStatus::Missing => {
            println!("{}", format!("~/{dest} (missing)").bold());
            match item.entry.kind {
                EntryKind::Symlink => {
                    println!("  would be created as a symlink to {}", item.entry.source);
                }
                EntryKind::Copy | EntryKind::Encrypted => {
                    println!("  would be created from {}", item.entry.source);
                }
            }
            println!();
            Ok(true)
        }
        ReconcileStatus::WrongTarget => {
            println!("{}", format!("~/{dest} (wrong link)").bold());
            match system.read_link(&item.dest) {
                Ok(target) => {
                    println!("  points to {} instead of {}", target.display(), item.source);
                }
                Err(_) => println!("  points elsewhere, expected {}", item.source),
            }
            println!();
            Ok(true)
        }
        ReconcileStatus::Conflict => {
            println!("{}", format!("~/{dest} (conflict)").bold());
            println!("  exists but is not a symlink to {}", item.source);
            println!();
            Ok(true)
        }
        ReconcileStatus::MissingSource => {
            println!("{}", format!("~/{dest} (missing source)").bold());
            println!("  {} does not exist in the repository", item.entry.source);
            println!();
            Ok(true)
        }
        ReconcileStatus::Inaccessible => {
            println!("{}", format!("~/{dest} (inaccessible)").bold());
            println!();
            Ok(true)
        }
        ReconcileStatus::Changed => print_content_diff(system, item),
    }
}

fn print_content_diff(system: &RealSystem, item: &ResolvedEntry<'_>) -> Result<bool> {
    let dest = &item.entry.dest;

    // Never decrypt for display; a diff must not spill plaintext.
    if item.entry.kind == EntryKind::Encrypted {
        println!("{}", format!("~/{dest} (changed)").bold());
        println!("  differs from its encrypted source (content not shown)");
        println!();
        return Ok(true);
    }

    if system.metadata(&item.dest)?.is_dir() {
        return print_dir_diff(system, item);
    }

    let dest_content = system.read_file(&item.dest)?;
    let source_content = system.read_file(&item.source)?;
    if is_binary(&dest_content) || is_binary(&source_content) {
        println!("{}", format!("~/{dest} (changed)").bold());
        println!("  Binary files differ");
        println!();
        return Ok(true);
    }

    println!("{}", format!("~/{dest}").bold());
    let old = String::from_utf8_lossy(&dest_content).into_owned();
    let new = String::from_utf8_lossy(&source_content).into_owned();
    let diff = TextDiff::from_lines(old.as_str(), new.as_str());
    let mut unified = diff.unified_diff();
    unified
        .context_radius(3)
        .header(&format!("~/{dest}"), &item.entry.source.to_string());
    for line in unified.to_string().lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{line}");
        }
    }
    println!();
    Ok(true)
}

fn print_dir_diff(system: &RealSystem, item: &ResolvedEntry<'_>) -> Result<bool> {
    println!("{}", format!("~/{}/", item.entry.dest).bold());
    let dest_files = system.walk_files(&item.dest)?;
    let source_files = if system.exists(&item.source) {
        system.walk_files(&item.source)?
    } else {
        Vec::new()
    };
    let source_set: HashSet<&RelPath> = source_files.iter().collect();
    let dest_set: HashSet<&RelPath> = dest_files.iter().collect();

    for rel in &dest_files {
        if source_set.contains(rel) {
            if !files_equal(system, &item.source.join(rel), &item.dest.join(rel))? {
                println!("  {rel} differs");
            }
        } else {
            println!("  only in ~/{}: {rel}", item.entry.dest);
        }
    }
    for rel in &source_files {
        if !dest_set.contains(rel) {
            println!("  only in {}: {rel}", item.entry.source);
        }
    }
    println!();
    Ok(true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use roost_core::AbsPath;
    use roost_engine::Resolver;
    use roost_manifest::FileEntry;

    #[test]
    fn filter_matches_dest_source_and_suffixes() {
        let resolver = Resolver::new(
            AbsPath::new("/repo".into()).unwrap(),
            AbsPath::new("/home/user".into()).unwrap(),
        );
        let entry = FileEntry::new(
            RelPath::new("files/config/nvim/init.lua".into()).unwrap(),
            RelPath::new(".config/nvim/init.lua".into()).unwrap(),
            EntryKind::Copy,
        );
        let resolved = resolver.resolve(&entry).unwrap();

        assert!(matches_filter(&resolved, Path::new(".config/nvim/init.lua")));
        assert!(matches_filter(
            &resolved,
            Path::new("files/config/nvim/init.lua")
        ));
        assert!(matches_filter(&resolved, Path::new("init.lua")));
        assert!(matches_filter(
            &resolved,
            Path::new("/home/user/.config/nvim/init.lua")
        ));
        assert!(!matches_filter(&resolved, Path::new(".vimrc")));
    }
}
