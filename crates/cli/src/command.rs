//! Command trait for roost CLI
//!
//! Every subcommand implements [`Command`], so dispatch, testing and error
//! handling look the same across the CLI.

use crate::common::RuntimeContext;
use crate::error::Result;

/// Trait for all roost commands
///
/// The `execute` method receives a [`RuntimeContext`] with the loaded
/// settings and resolved directories. Commands that yield a value (apply
/// returns its report, validate its problem count) declare it via the
/// `Output` associated type.
///
/// # Example
///
/// ```rust,ignore
/// use crate::command::Command;
/// use crate::common::RuntimeContext;
/// use crate::error::Result;
/// use clap::Args;
///
/// #[derive(Debug, Clone, Args)]
/// pub struct MyCommand {
///     #[arg(short, long)]
///     pub some_flag: bool,
/// }
///
/// impl Command for MyCommand {
///     type Output = ();
///
///     fn execute(&self, context: &RuntimeContext) -> Result<()> {
///         // context.paths.repo, context.paths.home, context.settings ...
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` describing what went wrong. Messages must
    /// stand on their own; the binary prints them verbatim.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
