//! Manifest model for roost
//!
//! The manifest is the single source of truth for which files roost manages.
//! It lives inside the dotfiles repository (`manifest.toml` by default) and
//! maps repository-relative sources to home-relative destinations, grouped
//! into `[symlinks]` and `[copies]` sections with optional
//! `[platform.<os>.*]` overrides.
//!
//! This crate owns parsing, validation, mutation and atomic persistence of
//! that file. It knows nothing about the filesystem state the manifest
//! describes; reconciliation lives in `roost-engine`.

pub mod entry;
pub mod error;
mod format;
mod manifest;

pub use entry::{EntryKind, FileEntry, platforms_overlap};
pub use error::{Error, Result};
pub use manifest::Manifest;
