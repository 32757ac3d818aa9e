//! Validate command implementation

use clap::Args;
use owo_colors::OwoColorize;
use roost_engine::{RealSystem, System};
use roost_manifest::platforms_overlap;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// Check the manifest for problems without touching any destination
///
/// Reported problems are unresolvable paths, sources missing from the
/// repository, and destinations claimed by more than one overlapping entry.
#[derive(Debug, Clone, Args)]
pub struct ValidateCommand {}

impl Command for ValidateCommand {
    type Output = usize;

    fn execute(&self, context: &RuntimeContext) -> Result<usize> {
        let manifest = context.load_manifest()?;
        let resolver = context.resolver();
        let system = RealSystem;
        let mut problems = 0usize;

        let entries = manifest.entries();
        for (i, entry) in entries.iter().enumerate() {
            match resolver.resolve(entry) {
                Err(e) => {
                    problems += 1;
                    println!("{} {}: {e}", "problem:".red(), entry.dest);
                }
                Ok(item) => {
                    if !system.exists(&item.source) && !system.is_symlink(&item.source) {
                        problems += 1;
                        println!(
                            "{} {}: source {} does not exist",
                            "problem:".red(),
                            entry.dest,
                            entry.source
                        );
                    }
                }
            }
            for earlier in &entries[..i] {
                if earlier.dest == entry.dest
                    && platforms_overlap(earlier.platform, entry.platform)
                {
                    problems += 1;
                    println!(
                        "{} {}: duplicate destination (also tracked as {})",
                        "problem:".red(),
                        entry.dest,
                        earlier.source
                    );
                }
            }
        }

        if problems == 0 {
            println!(
                "{}",
                format!("Manifest OK: {} entries.", manifest.len()).green()
            );
        }
        Ok(problems)
    }
}
