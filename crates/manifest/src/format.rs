//! On-disk manifest layout
//!
//! The TOML document has up to three sections:
//!
//! ```toml
//! [symlinks]
//! "files/fish" = ".config/fish"
//!
//! [copies]
//! "files/gitconfig" = ".gitconfig"
//!
//! [platform.darwin.symlinks]
//! "files/karabiner" = ".config/karabiner"
//! ```
//!
//! Keys are repository-relative sources and values are home-relative
//! destinations. Section order and key order are preserved exactly, so a
//! load/save cycle of a file roost wrote is byte identical. Empty sections
//! are never written.
//!
//! Encryption is not recorded here. Entries whose source matches the vault
//! pattern file are promoted from `copy` to `encrypted` after loading (see
//! [`crate::Manifest::classify`]), and encrypted entries serialize back into
//! `[copies]`.

use crate::entry::{EntryKind, FileEntry};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use roost_core::{Platform, RelPath};
use serde::{Deserialize, Serialize};

/// Root of the manifest document
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Document {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    symlinks: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    copies: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    platform: IndexMap<String, Sections>,
}

/// The per-platform subset of the document
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Sections {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    symlinks: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    copies: IndexMap<String, String>,
}

impl Document {
    /// Flatten the document into entries
    ///
    /// Order is the document order: `[symlinks]`, then `[copies]`, then
    /// platform blocks in file order.
    pub(crate) fn into_entries(self) -> Result<Vec<FileEntry>> {
        let mut entries = Vec::new();

        for (source, dest) in &self.symlinks {
            entries.push(make_entry(source, dest, EntryKind::Symlink, None)?);
        }
        for (source, dest) in &self.copies {
            entries.push(make_entry(source, dest, EntryKind::Copy, None)?);
        }
        for (name, sections) in &self.platform {
            let platform: Platform = name.parse()?;
            for (source, dest) in &sections.symlinks {
                entries.push(make_entry(source, dest, EntryKind::Symlink, Some(platform))?);
            }
            for (source, dest) in &sections.copies {
                entries.push(make_entry(source, dest, EntryKind::Copy, Some(platform))?);
            }
        }

        Ok(entries)
    }

    /// Group entries back into sections
    pub(crate) fn from_entries(entries: &[FileEntry]) -> Self {
        let mut doc = Document::default();

        for entry in entries {
            let source = entry.source.to_slash_string();
            let dest = entry.dest.to_slash_string();

            let sections = match entry.platform {
                None => (&mut doc.symlinks, &mut doc.copies),
                Some(platform) => {
                    let block = doc
                        .platform
                        .entry(platform.as_str().to_string())
                        .or_default();
                    (&mut block.symlinks, &mut block.copies)
                }
            };

            match entry.kind {
                EntryKind::Symlink => sections.0.insert(source, dest),
                // Encrypted is a derived classification of a copy.
                EntryKind::Copy | EntryKind::Encrypted => sections.1.insert(source, dest),
            };
        }

        doc
    }
}

fn make_entry(
    source: &str,
    dest: &str,
    kind: EntryKind,
    platform: Option<Platform>,
) -> Result<FileEntry> {
    let invalid = |which: &str, detail: &str| Error::InvalidEntry {
        source_path: source.to_string(),
        dest_path: dest.to_string(),
        reason: format!("{which} {detail}"),
    };

    let source_rel =
        RelPath::new(source.into()).map_err(|_| invalid("source", "must be a relative path"))?;
    let dest_rel =
        RelPath::new(dest.into()).map_err(|_| invalid("destination", "must be a relative path"))?;

    Ok(FileEntry {
        source: source_rel,
        dest: dest_rel,
        kind,
        platform,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    const SAMPLE: &str = r#"[symlinks]
"files/fish" = ".config/fish"
"files/nvim" = ".config/nvim"

[copies]
"files/gitconfig" = ".gitconfig"

[platform.darwin.symlinks]
"files/karabiner" = ".config/karabiner"
"#;

    #[test]
    fn parses_all_sections_in_order() {
        let doc: Document = toml::from_str(SAMPLE).unwrap();
        let entries = doc.into_entries().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].kind, EntryKind::Symlink);
        assert_eq!(entries[0].dest.to_slash_string(), ".config/fish");
        assert_eq!(entries[2].kind, EntryKind::Copy);
        assert_eq!(entries[3].platform, Some(Platform::Darwin));
    }

    #[test]
    fn unknown_section_is_a_parse_error() {
        let result: std::result::Result<Document, _> = toml::from_str("[links]\na = \"b\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_platform_is_rejected() {
        let doc: Document =
            toml::from_str("[platform.amiga.symlinks]\n\"files/x\" = \".x\"\n").unwrap();
        assert!(doc.into_entries().is_err());
    }

    #[test]
    fn absolute_destination_is_rejected() {
        let doc: Document = toml::from_str("[symlinks]\n\"files/x\" = \"/etc/x\"\n").unwrap();
        let err = doc.into_entries().unwrap_err();
        assert!(err.to_string().contains("must be a relative path"));
    }

    #[test]
    fn empty_sections_are_omitted_on_write() {
        let doc = Document::from_entries(&[]);
        assert_eq!(toml::to_string(&doc).unwrap(), "");
    }

    #[test]
    fn encrypted_entries_serialize_as_copies() {
        let entry = FileEntry::new(
            RelPath::new("secrets/token".into()).unwrap(),
            RelPath::new(".config/hub".into()).unwrap(),
            EntryKind::Encrypted,
        );
        let doc = Document::from_entries(std::slice::from_ref(&entry));
        let text = toml::to_string(&doc).unwrap();
        assert!(text.contains("[copies]"));
        assert!(!text.contains("encrypted"));
    }
}
