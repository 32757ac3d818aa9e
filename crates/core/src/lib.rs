//! Core types and utilities for roost
//!
//! This is the foundation crate that all other roost crates depend on.
//! It provides:
//! - Path types (AbsPath, RelPath)
//! - Base error types
//! - Platform detection
//!
//! This crate has no dependencies on other roost crates.

pub mod error;
pub mod path;
pub mod platform;

pub use error::{Error, Result};
pub use path::{AbsPath, RelPath};
pub use platform::{CURRENT_PLATFORM, Platform};
