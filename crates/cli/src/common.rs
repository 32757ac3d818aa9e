//! Shared runtime state for CLI commands

use crate::error::{CommandError, Result};
use roost_config::Settings;
use roost_core::{AbsPath, CURRENT_PLATFORM, Platform, RelPath};
use roost_engine::Resolver;
use roost_manifest::Manifest;
use roost_vault::{AgeCli, EncryptPatterns};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Absolute directories one command invocation operates on
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    /// Repository holding the tracked sources
    pub repo: AbsPath,
    /// Home directory destinations materialize into
    pub home: AbsPath,
    /// Manifest file inside the repository
    pub manifest: AbsPath,
}

impl ResolvedPaths {
    /// Resolve the repository and home directories
    ///
    /// Repository precedence: `--repo` flag (or `ROOST_REPO`), then
    /// `[general] repo` from the settings file, then `~/dotfiles`. The home
    /// directory comes from `--home` (or `ROOST_HOME`) and defaults to the
    /// real one. Nothing is required to exist yet; commands that need the
    /// manifest report its absence themselves.
    pub fn resolve(settings: &Settings, repo: Option<&Path>, home: Option<&Path>) -> Result<Self> {
        let repo = match repo {
            Some(path) => absolutize(path)?,
            None => {
                let configured = settings
                    .repo_dir()
                    .or_else(roost_config::dirs::default_repo_dir)
                    .ok_or(CommandError::NoHomeDir)?;
                absolutize(&configured)?
            }
        };
        let home = match home {
            Some(path) => absolutize(path)?,
            None => {
                let real = dirs::home_dir().ok_or(CommandError::NoHomeDir)?;
                AbsPath::new(real)?.normalized()
            }
        };
        let manifest = repo.join(&RelPath::from_str_path(&settings.general.manifest)?);

        Ok(ResolvedPaths {
            repo,
            home,
            manifest,
        })
    }
}

/// Everything a command needs at run time
///
/// One context is built per invocation and handed to the executing command
/// by reference.
pub struct RuntimeContext {
    /// Settings file content, defaults when no file exists
    pub settings: Arc<Settings>,
    /// Resolved directories
    pub paths: ResolvedPaths,
    /// Platform whose entries participate in reconciliation
    pub platform: Platform,
}

impl RuntimeContext {
    /// Build a context from settings and optional flag overrides
    pub fn new(settings: Settings, repo: Option<&Path>, home: Option<&Path>) -> Result<Self> {
        let paths = ResolvedPaths::resolve(&settings, repo, home)?;
        debug!(repo = %paths.repo, home = %paths.home, "resolved paths");
        Ok(RuntimeContext {
            settings: Arc::new(settings),
            paths,
            platform: *CURRENT_PLATFORM,
        })
    }

    /// Path resolver over the context's repository and home roots
    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.paths.repo.clone(), self.paths.home.clone())
    }

    /// Encryption patterns from the repository, default set when absent
    pub fn encrypt_patterns(&self) -> Result<EncryptPatterns> {
        let rel = RelPath::from_str_path(&self.settings.vault.patterns)?;
        Ok(EncryptPatterns::load(&self.paths.repo.join(&rel))?)
    }

    /// Load the manifest and promote entries the pattern file marks encrypted
    pub fn load_manifest(&self) -> Result<Manifest> {
        let mut manifest = Manifest::load(&self.paths.manifest)?;
        self.classify(&mut manifest)?;
        Ok(manifest)
    }

    /// Like [`load_manifest`], but a missing manifest file yields an empty one
    ///
    /// [`load_manifest`]: Self::load_manifest
    pub fn load_manifest_or_default(&self) -> Result<Manifest> {
        let mut manifest = Manifest::load_or_default(&self.paths.manifest)?;
        self.classify(&mut manifest)?;
        Ok(manifest)
    }

    fn classify(&self, manifest: &mut Manifest) -> Result<()> {
        let patterns = self.encrypt_patterns()?;
        manifest.classify(|source| patterns.matches(source));
        Ok(())
    }

    /// Construct the configured secret provider
    ///
    /// `None` when no identity is configured and none sits at the default
    /// location.
    pub fn provider(&self) -> Result<Option<AgeCli>> {
        let identity = self
            .settings
            .identity_file()
            .or_else(|| roost_config::dirs::default_identity_file().filter(|p| p.is_file()));
        let Some(identity) = identity else {
            return Ok(None);
        };
        let provider = AgeCli::new(identity, self.settings.vault.recipient.clone())?;
        Ok(Some(provider))
    }

    /// Provider for paths that degrade gracefully without one
    ///
    /// Encrypted entries then surface as inaccessible or failed instead of
    /// aborting the whole command.
    pub fn provider_or_none(&self) -> Option<AgeCli> {
        match self.provider() {
            Ok(provider) => provider,
            Err(e) => {
                warn!("secret provider unavailable: {e}");
                None
            }
        }
    }
}

/// Make a user-supplied path absolute without touching the filesystem
///
/// A leading `~` expands to the home directory and relative paths are taken
/// from the current working directory. Symlinks are not resolved; entry
/// containment checks work on the lexical form.
pub fn absolutize(path: &Path) -> Result<AbsPath> {
    let expanded = roost_config::expand_tilde(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };
    Ok(AbsPath::new(absolute)?.normalized())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use std::path::PathBuf;

    fn settings_with_repo(repo: &str) -> Settings {
        let mut settings = Settings::default();
        settings.general.repo = Some(PathBuf::from(repo));
        settings
    }

    #[test]
    fn repo_flag_wins_over_settings() {
        let settings = settings_with_repo("/configured/repo");
        let paths =
            ResolvedPaths::resolve(&settings, Some(Path::new("/flag/repo")), None).unwrap();
        assert_eq!(paths.repo.as_path(), Path::new("/flag/repo"));
    }

    #[test]
    fn settings_repo_used_without_flag() {
        let settings = settings_with_repo("/configured/repo");
        let paths = ResolvedPaths::resolve(&settings, None, None).unwrap();
        assert_eq!(paths.repo.as_path(), Path::new("/configured/repo"));
    }

    #[test]
    fn manifest_lives_inside_the_repo() {
        let settings = settings_with_repo("/configured/repo");
        let paths = ResolvedPaths::resolve(&settings, None, None).unwrap();
        assert_eq!(
            paths.manifest.as_path(),
            Path::new("/configured/repo/manifest.toml")
        );
    }

    #[test]
    fn home_flag_overrides_the_real_home() {
        let settings = settings_with_repo("/configured/repo");
        let paths =
            ResolvedPaths::resolve(&settings, None, Some(Path::new("/tmp/fakehome"))).unwrap();
        assert_eq!(paths.home.as_path(), Path::new("/tmp/fakehome"));
    }

    #[test]
    fn absolutize_normalizes_dot_components() {
        let abs = absolutize(Path::new("/a/b/../c/./d")).unwrap();
        assert_eq!(abs.as_path(), Path::new("/a/c/d"));
    }

    #[test]
    fn absolutize_anchors_relative_paths_in_cwd() {
        let abs = absolutize(Path::new("some/file")).unwrap();
        assert!(abs.as_path().is_absolute());
        assert!(abs.as_path().ends_with("some/file"));
    }
}
