//! Collect command implementation
//!
//! The inverse of apply: gather local edits of copied destinations back
//! into the repository. Symlinked destinations already write through and
//! are skipped.

use clap::Args;
use roost_engine::{CollectOptions, DryRunSystem, RealSystem, Reconciler, Report, Resolver, System};
use roost_manifest::FileEntry;
use roost_vault::AgeCli;
use tracing::info;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::render;

/// Gather local edits of copied files back into the repository
#[derive(Debug, Clone, Args)]
pub struct CollectCommand {
    /// Show what would be collected without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl Command for CollectCommand {
    type Output = Report;

    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output> {
        let manifest = context.load_manifest()?;
        if manifest.is_empty() {
            println!("No files in manifest.");
            return Ok(Report::default());
        }

        let active = manifest.for_platform(context.platform);
        info!(
            entries = active.len(),
            platform = %context.platform,
            dry_run = self.dry_run,
            "collecting drift"
        );

        let resolver = context.resolver();
        let provider = context.provider_or_none();
        let options = CollectOptions {
            dry_run: self.dry_run,
        };

        let real = RealSystem;
        let report = if self.dry_run {
            let recorder = DryRunSystem::new(&real);
            run(&recorder, &resolver, provider.as_ref(), &active, options)?
        } else {
            run(&real, &resolver, provider.as_ref(), &active, options)?
        };

        render::print_report(&report, self.dry_run);
        Ok(report)
    }
}

fn run(
    system: &dyn System,
    resolver: &Resolver,
    provider: Option<&AgeCli>,
    entries: &[&FileEntry],
    options: CollectOptions,
) -> Result<Report> {
    let mut reconciler = Reconciler::new(system, resolver);
    if let Some(provider) = provider {
        reconciler = reconciler.with_provider(provider);
    }
    Ok(reconciler.collect(entries, options)?)
}
