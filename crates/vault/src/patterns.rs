//! Which repository sources are stored encrypted
//!
//! The repository carries a pattern file (`.roost/encrypt` by default) with
//! one pattern per line. A source that matches any pattern is treated as
//! ciphertext: `apply` decrypts it, `collect` encrypts into it. Lines
//! starting with `#` are comments.
//!
//! A pattern without wildcards matches the path itself and everything under
//! it, so the default file is just `secrets/**` and a hand-written `secrets`
//! line means the same thing.

use crate::{Error, Result};
use roost_core::{AbsPath, RelPath};
use tracing::debug;

const DEFAULT_PATTERNS: &str = "secrets/**\n";

#[derive(Debug)]
enum Rule {
    Glob(glob::Pattern),
    Literal(String),
}

impl Rule {
    fn matches(&self, path: &str) -> bool {
        match self {
            Rule::Glob(pattern) => pattern.matches(path),
            Rule::Literal(prefix) => {
                path == prefix || path.strip_prefix(prefix.as_str()).is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// The parsed pattern file
#[derive(Debug)]
pub struct EncryptPatterns {
    rules: Vec<Rule>,
}

impl EncryptPatterns {
    /// Read the pattern file, falling back to the default set when missing
    pub fn load(path: &AbsPath) -> Result<Self> {
        match std::fs::read_to_string(path.as_path()) {
            Ok(text) => {
                let patterns = Self::parse(&text)?;
                debug!(path = %path, rules = patterns.rules.len(), "loaded encrypt patterns");
                Ok(patterns)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default_set()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Parse pattern file content
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] for a malformed glob.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rules = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.contains(['*', '?', '[']) {
                let pattern = glob::Pattern::new(line).map_err(|source| Error::Pattern {
                    pattern: line.to_string(),
                    source,
                })?;
                rules.push(Rule::Glob(pattern));
            } else {
                rules.push(Rule::Literal(line.trim_end_matches('/').to_string()));
            }
        }
        Ok(EncryptPatterns { rules })
    }

    /// The built-in set: everything under `secrets/`
    pub fn default_set() -> Self {
        // The default pattern is statically valid.
        Self::parse(DEFAULT_PATTERNS).expect("default patterns parse")
    }

    /// Whether `source` is stored encrypted
    pub fn matches(&self, source: &RelPath) -> bool {
        let path = source.to_slash_string();
        self.rules.iter().any(|rule| rule.matches(&path))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are configured
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for EncryptPatterns {
    fn default() -> Self {
        Self::default_set()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn rel(s: &str) -> RelPath {
        RelPath::new(s.into()).unwrap()
    }

    #[test]
    fn default_covers_the_secrets_tree() {
        let patterns = EncryptPatterns::default_set();
        assert!(patterns.matches(&rel("secrets/ssh/id_ed25519")));
        assert!(patterns.matches(&rel("secrets/token")));
        assert!(!patterns.matches(&rel("files/gitconfig")));
    }

    #[test]
    fn comments_and_blanks_are_skipped() {
        let patterns = EncryptPatterns::parse("# keys\n\nsecrets/**\n").unwrap();
        assert_eq!(patterns.len(), 1);
    }

    #[test]
    fn literal_line_matches_itself_and_children() {
        let patterns = EncryptPatterns::parse("private\n").unwrap();
        assert!(patterns.matches(&rel("private")));
        assert!(patterns.matches(&rel("private/netrc")));
        assert!(!patterns.matches(&rel("privateer")));
    }

    #[test]
    fn glob_patterns_match_by_name() {
        let patterns = EncryptPatterns::parse("*.key\nwork/*.pem\n").unwrap();
        assert!(patterns.matches(&rel("api.key")));
        assert!(patterns.matches(&rel("work/client.pem")));
        assert!(!patterns.matches(&rel("api.pub")));
    }

    #[test]
    fn malformed_glob_is_an_error() {
        assert!(EncryptPatterns::parse("secrets/[\n").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = AbsPath::from_path(&dir.path().join("encrypt")).unwrap();
        let patterns = EncryptPatterns::load(&path).unwrap();
        assert!(patterns.matches(&rel("secrets/token")));
    }
}
