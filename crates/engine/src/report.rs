//! Aggregated run results
//!
//! A [`Report`] keeps outcomes in the order entries were processed; a
//! [`StatusReport`] sorts inspection rows by destination for display.

use crate::inspect::{Inspector, ReconcileStatus};
use crate::outcome::{EntryOutcome, Outcome};
use crate::resolve::ResolvedEntry;
use roost_core::{AbsPath, RelPath};
use roost_manifest::EntryKind;

/// Outcome sequence of one apply or collect run
#[derive(Debug, Default)]
pub struct Report {
    outcomes: Vec<EntryOutcome>,
    backup_dir: Option<AbsPath>,
}

impl Report {
    pub(crate) fn new() -> Self {
        Report::default()
    }

    pub(crate) fn push(&mut self, dest: RelPath, kind: EntryKind, outcome: Outcome) {
        self.outcomes.push(EntryOutcome {
            dest,
            kind,
            outcome,
        });
    }

    pub(crate) fn set_backup_dir(&mut self, dir: Option<AbsPath>) {
        self.backup_dir = dir;
    }

    /// Outcomes in the order the entries were processed
    pub fn outcomes(&self) -> &[EntryOutcome] {
        &self.outcomes
    }

    /// Where displaced files were preserved, when any were
    pub fn backup_dir(&self) -> Option<&AbsPath> {
        self.backup_dir.as_ref()
    }

    /// Number of entries in the report
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the report holds no entries
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, matches: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| matches(&o.outcome)).count()
    }

    /// Entries that already matched
    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Unchanged))
    }

    /// Entries created from scratch
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Created))
    }

    /// Entries replaced under force
    pub fn replaced(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Replaced))
    }

    /// Entries gathered back into the repository
    pub fn collected(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Collected))
    }

    /// Entries blocked on a conflicting destination
    pub fn needs_force(&self) -> usize {
        self.count(|o| matches!(o, Outcome::NeedsForce))
    }

    /// Entries that did not participate
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    /// Entries that failed
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    /// Whether the run finished without a single failed entry
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }
}

/// One row of a status table
#[derive(Debug)]
pub struct StatusRow {
    /// Destination the entry manages, relative to home
    pub dest: RelPath,
    /// Materialization strategy of the entry
    pub kind: EntryKind,
    /// Inspection result
    pub status: ReconcileStatus,
}

/// Inspection results for a set of entries, sorted by destination
#[derive(Debug, Default)]
pub struct StatusReport {
    rows: Vec<StatusRow>,
}

impl StatusReport {
    /// Inspect every entry and aggregate the rows
    pub fn gather(inspector: &Inspector<'_>, resolved: &[ResolvedEntry<'_>]) -> Self {
        let mut rows: Vec<StatusRow> = resolved
            .iter()
            .map(|item| StatusRow {
                dest: item.entry.dest.clone(),
                kind: item.entry.kind,
                status: inspector.status(item),
            })
            .collect();
        rows.sort_by(|a, b| a.dest.cmp(&b.dest));
        StatusReport { rows }
    }

    /// Rows sorted by destination
    pub fn rows(&self) -> &[StatusRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the report holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows whose status is anything but ok
    pub fn attention(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.status.needs_attention())
            .count()
    }
}
