//! Remove command implementation

use clap::Args;
use owo_colors::OwoColorize;
use roost_core::{Platform, RelPath};
use roost_engine::{RealSystem, System};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::command::Command;
use crate::common::{self, RuntimeContext};
use crate::error::{CommandError, Result};

/// Stop tracking a file
///
/// The repository source and any copied destination stay where they are; only
/// the manifest entry goes away. A symlinked destination is unlinked because
/// it would otherwise dangle once the repository moves on.
#[derive(Debug, Clone, Args)]
pub struct RemoveCommand {
    /// Destination to stop tracking, as a home-relative or absolute path
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,

    /// Platform qualifier of the entry to remove; omit for unqualified entries
    #[arg(short, long, value_name = "PLATFORM")]
    pub platform: Option<Platform>,
}

impl Command for RemoveCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let dest = dest_rel(&self.dest, context)?;
        let mut manifest = context.load_manifest()?;
        if !manifest.remove(&dest, self.platform)? {
            println!("Not tracked: {dest}");
            return Ok(());
        }
        info!(dest = %dest, platform = ?self.platform, "untracked file");

        let system = RealSystem;
        let dest_abs = context.paths.home.join(&dest);
        if system.is_symlink(&dest_abs) {
            system.remove(&dest_abs)?;
            println!("Removed symlink: ~/{dest}");
        }
        println!("{}", format!("Removed from tracking: {dest}").green());
        Ok(())
    }
}

/// Interpret the argument as a home-relative destination
fn dest_rel(arg: &Path, context: &RuntimeContext) -> Result<RelPath> {
    if arg.is_absolute() || arg.starts_with("~") {
        let abs = common::absolutize(arg)?;
        return abs.strip_prefix(&context.paths.home).map_err(|_| {
            CommandError::not_under_home(
                abs.as_path().to_path_buf(),
                context.paths.home.as_path().to_path_buf(),
            )
        });
    }
    Ok(RelPath::new(arg.to_path_buf())?)
}
