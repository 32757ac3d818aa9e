//! Roost CLI library
//!
//! All CLI logic lives here so integration tests can drive commands the same
//! way the binary does.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;
pub mod render;

use clap::{Parser, Subcommand};
use roost_config::Settings;
use std::path::PathBuf;

use command::Command;
use common::RuntimeContext;
use error::CommandError;

/// Roost - keep your home directory in sync with a dotfiles repository
#[derive(Parser)]
#[command(name = "roost")]
#[command(about = "Keep your home directory in sync with a dotfiles repository")]
#[command(version)]
#[command(long_about = "Keep your home directory in sync with a dotfiles repository.

A manifest inside the repository declares which files are managed and how:
symlinked into place, copied, or stored encrypted and decrypted on apply.
`apply` makes the home directory match the repository, `collect` gathers
local edits of copied files back, and `status`/`diff` show where the two
disagree.")]
pub struct Cli {
    /// Path to the dotfiles repository
    #[arg(long, env = "ROOST_REPO", value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Directory to treat as home (usually $HOME)
    #[arg(long, env = "ROOST_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Path to the settings file
    #[arg(long, env = "ROOST_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "ROOST_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the roost CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Make the home directory match the repository
    Apply(cmd::apply::ApplyCommand),

    /// Gather local edits of copied files back into the repository
    Collect(cmd::collect::CollectCommand),

    /// Show repository state and which files need attention
    Status(cmd::status::StatusCommand),

    /// Show how destinations differ from their sources
    Diff(cmd::diff::DiffCommand),

    /// Start tracking a file
    Add(cmd::add::AddCommand),

    /// Stop tracking a file
    Remove(cmd::remove::RemoveCommand),

    /// List every tracked entry
    List(cmd::list::ListCommand),

    /// Scan the home directory for dotfiles not yet tracked
    Import(cmd::import::ImportCommand),

    /// Check the manifest for problems
    Validate(cmd::validate::ValidateCommand),
}

/// Execute the parsed subcommand against the runtime context
fn execute_command(command: Commands, context: &RuntimeContext) -> Result<(), CommandError> {
    match command {
        Commands::Apply(cmd) => {
            let report = cmd.execute(context)?;
            if !report.is_clean() {
                return Err(CommandError::EntriesFailed {
                    failed: report.failed(),
                    total: report.len(),
                });
            }
        }
        Commands::Collect(cmd) => {
            let report = cmd.execute(context)?;
            if !report.is_clean() {
                return Err(CommandError::EntriesFailed {
                    failed: report.failed(),
                    total: report.len(),
                });
            }
        }
        Commands::Status(cmd) => cmd.execute(context)?,
        Commands::Diff(cmd) => cmd.execute(context)?,
        Commands::Add(cmd) => cmd.execute(context)?,
        Commands::Remove(cmd) => cmd.execute(context)?,
        Commands::List(cmd) => cmd.execute(context)?,
        Commands::Import(cmd) => cmd.execute(context)?,
        Commands::Validate(cmd) => {
            let problems = cmd.execute(context)?;
            if problems > 0 {
                return Err(CommandError::ManifestInvalid { problems });
            }
        }
    }
    Ok(())
}

/// Run the CLI
///
/// # Errors
///
/// Returns an error if logging initialization fails, the settings file is
/// unreadable, directories cannot be resolved, or the command itself fails.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    roost_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let settings = Settings::load_or_default(cli.config.as_deref())?;
    let context = RuntimeContext::new(settings, cli.repo.as_deref(), cli.home.as_deref())?;
    execute_command(cli.command, &context)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn apply_flags_parse() {
        let cli = Cli::parse_from(["roost", "apply", "--dry-run", "--force", "--no-backup"]);
        let Commands::Apply(cmd) = cli.command else {
            panic!("expected apply");
        };
        assert!(cmd.dry_run);
        assert!(cmd.force);
        assert!(cmd.no_backup);
    }

    #[test]
    fn add_accepts_kind_and_platform() {
        let cli = Cli::parse_from([
            "roost", "add", "--kind", "copy", "--platform", "darwin", ".zshrc",
        ]);
        let Commands::Add(cmd) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(cmd.kind, cmd::add::AddKind::Copy);
        assert_eq!(cmd.platform, Some(roost_core::Platform::Darwin));
        assert!(!cmd.secret);
    }

    #[test]
    fn repo_flag_is_global_to_the_cli() {
        let cli = Cli::parse_from(["roost", "--repo", "/tmp/dotfiles", "list"]);
        assert_eq!(cli.repo.as_deref(), Some(std::path::Path::new("/tmp/dotfiles")));
        assert!(matches!(cli.command, Commands::List(_)));
    }
}
