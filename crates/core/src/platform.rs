//! Platform detection for cross-platform dotfile management
//!
//! Manifest entries may be restricted to one operating system. Names follow
//! the Unix kernel convention:
//! - macOS → `"darwin"` (kernel name)
//! - Linux → `"linux"`
//! - Windows → `"windows"`
//!
//! The running platform is detected at compile time and cached.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// The platform this process is running on (cached)
///
/// # Example
/// ```
/// use roost_core::platform::CURRENT_PLATFORM;
///
/// let section = format!("platform.{}", *CURRENT_PLATFORM);
/// ```
pub static CURRENT_PLATFORM: LazyLock<Platform> = LazyLock::new(Platform::current);

/// An operating system a manifest entry can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS
    Darwin,
    /// Linux (and other non-Apple unixes)
    Linux,
    /// Windows
    Windows,
}

impl Platform {
    /// Detect the platform of the running process
    ///
    /// Non-Apple unixes reconcile the `linux` sections.
    pub const fn current() -> Self {
        #[cfg(target_os = "macos")]
        {
            Platform::Darwin
        }

        #[cfg(target_os = "windows")]
        {
            Platform::Windows
        }

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            Platform::Linux
        }
    }

    /// Lowercase name as it appears in manifests
    pub const fn as_str(self) -> &'static str {
        match self {
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "darwin" | "macos" => Ok(Platform::Darwin),
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            other => Err(Error::UnknownPlatform(other.to_string())),
        }
    }
}
