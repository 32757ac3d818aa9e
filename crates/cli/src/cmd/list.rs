//! List command implementation

use clap::Args;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::render;

/// List every tracked entry
#[derive(Debug, Clone, Args)]
pub struct ListCommand {}

impl Command for ListCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let manifest = context.load_manifest()?;
        if manifest.is_empty() {
            println!("No tracked entries.");
            return Ok(());
        }

        let mut table = render::create_table(&["Kind", "Source", "Destination", "Platform"]);
        for entry in manifest.entries() {
            table.add_row(vec![
                entry.kind.as_str().to_owned(),
                entry.source.to_string(),
                format!("~/{}", entry.dest),
                entry.platform.map_or("-".to_owned(), |p| p.as_str().to_owned()),
            ]);
        }
        println!("{table}");
        println!("{} entries", manifest.len());
        Ok(())
    }
}
