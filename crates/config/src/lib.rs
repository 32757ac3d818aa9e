//! Configuration management for roost
//!
//! This crate handles the ambient concerns shared by every command:
//! - Settings loading with defaults
//! - Well-known directory locations
//! - Version-control summaries for the repository
//! - Logging initialization

pub mod dirs;
pub mod git;
pub mod logging;
pub mod settings;

// Re-export error types from core
pub use roost_core::{Error, Result};

// Re-export main types
pub use git::{GitVcs, VcsProvider, VcsSummary};
pub use settings::{BackupSettings, GeneralSettings, Settings, VaultSettings, expand_tilde};
