//! # Roost Engine
//!
//! Reconciliation engine for the roost dotfile manager.
//!
//! Given manifest entries and a pair of roots (repository and home), this
//! crate decides what state each destination is in and performs the minimal
//! operations to line it up with the manifest:
//!
//! - **Resolution**: entry paths made absolute, with escape rejection
//! - **Inspection**: read-only status classification per entry
//! - **Apply**: symlinks, copies and decrypted secrets materialized under home
//! - **Collect**: destination edits gathered back into the repository
//! - **System Abstraction**: filesystem operations behind a trait, with a
//!   recording implementation backing dry runs

pub mod apply;
pub mod backup;
pub mod collect;
pub mod content;
pub mod error;
pub mod inspect;
pub mod outcome;
pub mod report;
pub mod resolve;
pub mod system;

pub use apply::{ApplyOptions, Reconciler, is_sensitive};
pub use backup::BackupSession;
pub use collect::{COMMON_DOTFILES, Candidate, CollectOptions, scan_candidates};
pub use content::{dirs_equal, files_equal, hash_data, is_binary};
pub use error::{Error, Result};
pub use inspect::{Inspector, ReconcileStatus};
pub use outcome::{EntryOutcome, Outcome};
pub use report::{Report, StatusReport, StatusRow};
pub use resolve::{ResolvedEntry, Resolver};
pub use system::{DryRunSystem, Operation, RealSystem, System};
