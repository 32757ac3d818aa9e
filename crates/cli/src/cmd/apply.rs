//! Apply command implementation
//!
//! Reconcile the home directory with the manifest: create missing symlinks
//! and copies, replace conflicting destinations under `--force`.

use clap::Args;
use roost_engine::{ApplyOptions, DryRunSystem, RealSystem, Reconciler, Report, Resolver, System};
use roost_manifest::FileEntry;
use roost_vault::AgeCli;
use tracing::info;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::render;

/// Make the home directory match the manifest
#[derive(Debug, Clone, Args)]
pub struct ApplyCommand {
    /// Show what would be done without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Replace destinations that are in the way
    #[arg(short, long)]
    pub force: bool,

    /// Skip the pre-apply backup of displaced files
    #[arg(long)]
    pub no_backup: bool,
}

impl Command for ApplyCommand {
    type Output = Report;

    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output> {
        let manifest = context.load_manifest()?;
        if manifest.is_empty() {
            println!("No files in manifest. Track one with: roost add <file>");
            return Ok(Report::default());
        }

        let active = manifest.for_platform(context.platform);
        info!(
            entries = active.len(),
            platform = %context.platform,
            force = self.force,
            dry_run = self.dry_run,
            "applying manifest"
        );

        let resolver = context.resolver();
        let provider = context.provider_or_none();
        let options = ApplyOptions {
            force: self.force,
            dry_run: self.dry_run,
            backup: context.settings.backup.enabled && !self.no_backup,
        };

        // The dry run goes through the identical reconciler over a recording
        // system, so its classifications match what a live run would do.
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
    options: ApplyOptions,
) -> Result<Report> {
    let mut reconciler = Reconciler::new(system, resolver);
    if let Some(provider) = provider {
        reconciler = reconciler.with_provider(provider);
    }
    Ok(reconciler.apply(entries, options)?)
}
