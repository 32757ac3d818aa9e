//! Status command implementation
//!
//! One screen of health: version control position, tracked entry counts
//! and how many entries need attention.

use clap::Args;
use owo_colors::OwoColorize;
use roost_config::{GitVcs, VcsProvider, VcsSummary};
use roost_engine::{Inspector, RealSystem, StatusReport};
use roost_manifest::EntryKind;
use tracing::debug;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// Summarize repository and entry health
#[derive(Debug, Clone, Args)]
pub struct StatusCommand {}

impl Command for StatusCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        print_vcs(context);

        let manifest = context.load_manifest()?;
        let active = manifest.for_platform(context.platform);
        let count = |kind: EntryKind| active.iter().filter(|e| e.kind == kind).count();
        println!(
            "Files: {} symlinks, {} copies, {} encrypted",
            count(EntryKind::Symlink),
            count(EntryKind::Copy),
            count(EntryKind::Encrypted),
        );

        let resolver = context.resolver();
        let resolved = resolver.resolve_all(&active)?;
        let system = RealSystem;
        let provider = context.provider_or_none();
        let mut inspector = Inspector::new(&system);
        if let Some(provider) = provider.as_ref() {
            inspector = inspector.with_provider(provider);
        }
        let report = StatusReport::gather(&inspector, &resolved);

        let attention = report.attention();
        if attention == 0 {
            println!("{}", "All files in sync".green());
        } else {
            println!(
                "{}",
                format!("{attention} file(s) need attention - run 'roost diff' for details")
                    .yellow()
            );
        }
        Ok(())
    }
}

fn print_vcs(context: &RuntimeContext) {
    match GitVcs.summary(context.paths.repo.as_path()) {
        Ok(Some(summary)) => {
            println!(
                "Branch: {}{}",
                summary.branch.bold(),
                upstream_note(&summary)
            );
            if summary.changes.is_empty() {
                println!("Working tree: clean");
            } else {
                println!("Working tree: {} change(s)", summary.changes.len());
            }
        }
        Ok(None) => {
            println!(
                "Repository: {} (not under version control)",
                context.paths.repo
            );
        }
        Err(e) => debug!("vcs summary unavailable: {e}"),
    }
}

fn upstream_note(summary: &VcsSummary) -> String {
    let mut parts = Vec::new();
    if let Some(ahead) = summary.ahead.filter(|n| *n > 0) {
        parts.push(format!("{ahead} ahead"));
    }
    if let Some(behind) = summary.behind.filter(|n| *n > 0) {
        parts.push(format!("{behind} behind"));
    }
    if parts.is_empty() {
        if summary.ahead.is_some() || summary.behind.is_some() {
            return format!(" {}", "up to date".green());
        }
        return String::new();
    }
    format!(" {}", parts.join(", ").yellow())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn summary(ahead: Option<usize>, behind: Option<usize>) -> VcsSummary {
        VcsSummary {
            branch: String::from("main"),
            ahead,
            behind,
            changes: Vec::new(),
        }
    }

    #[test]
    fn upstream_note_counts_both_directions() {
        let note = upstream_note(&summary(Some(2), Some(1)));
        assert!(note.contains("2 ahead"));
        assert!(note.contains("1 behind"));
    }

    #[test]
    fn upstream_note_reports_up_to_date() {
        assert!(upstream_note(&summary(Some(0), Some(0))).contains("up to date"));
    }

    #[test]
    fn upstream_note_is_empty_without_an_upstream() {
        assert!(upstream_note(&summary(None, None)).is_empty());
    }
}
