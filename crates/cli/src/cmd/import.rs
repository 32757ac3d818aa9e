//! Import command implementation

use clap::Args;
use roost_engine::{RealSystem, scan_candidates};

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::render;

/// Scan the home directory for dotfiles not yet tracked
#[derive(Debug, Clone, Args)]
pub struct ImportCommand {}

impl Command for ImportCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let manifest = context.load_manifest_or_default()?;
        let candidates = scan_candidates(
            &RealSystem,
            &context.paths.home,
            &context.paths.repo,
            manifest.entries(),
        );
        if candidates.is_empty() {
            println!("No new dotfiles found to import");
            return Ok(());
        }

        let mut table = render::create_table(&["File", "Type", "Size"]);
        for candidate in &candidates {
            table.add_row(vec![
                format!("~/{}", candidate.dest),
                if candidate.is_dir { "dir" } else { "file" }.to_owned(),
                render::format_size(candidate.size),
            ]);
        }
        println!("{table}");
        println!("Found {} dotfiles", candidates.len());
        println!("Use 'roost add <file>' to add individually");
        Ok(())
    }
}
