//! CLI command implementations
//!
//! One module per subcommand; each exposes a clap `Args` struct that
//! implements [`crate::command::Command`].

pub mod add;
pub mod apply;
pub mod collect;
pub mod diff;
pub mod import;
pub mod list;
pub mod remove;
pub mod status;
pub mod validate;
