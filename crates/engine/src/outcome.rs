//! Per-entry results of apply and collect runs

use roost_core::RelPath;
use roost_manifest::EntryKind;
use std::fmt;

/// What happened to one entry during apply or collect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Destination already matched; nothing was done
    Unchanged,
    /// Destination did not exist and was created
    Created,
    /// An existing destination was replaced under force
    Replaced,
    /// Destination drift was copied back into the repository
    Collected,
    /// A conflicting destination exists and force was not given
    NeedsForce,
    /// Entry does not participate in this operation
    Skipped,
    /// The entry failed; other entries keep going
    Failed(String),
}

impl Outcome {
    /// Short lowercase label for log lines and summaries
    pub const fn as_str(&self) -> &'static str {
        match self {
            Outcome::Unchanged => "unchanged",
            Outcome::Created => "created",
            Outcome::Replaced => "replaced",
            Outcome::Collected => "collected",
            Outcome::NeedsForce => "needs force",
            Outcome::Skipped => "skipped",
            Outcome::Failed(_) => "failed",
        }
    }

    /// Whether the outcome mutated the filesystem
    pub const fn mutated(&self) -> bool {
        matches!(self, Outcome::Created | Outcome::Replaced | Outcome::Collected)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// An outcome attached to the entry that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    /// Destination the entry manages, relative to home
    pub dest: RelPath,
    /// Materialization strategy of the entry
    pub kind: EntryKind,
    /// What the engine did, or declined to do
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn only_write_outcomes_count_as_mutations() {
        assert!(Outcome::Created.mutated());
        assert!(Outcome::Replaced.mutated());
        assert!(Outcome::Collected.mutated());
        assert!(!Outcome::Unchanged.mutated());
        assert!(!Outcome::NeedsForce.mutated());
        assert!(!Outcome::Skipped.mutated());
        assert!(!Outcome::Failed(String::from("boom")).mutated());
    }

    #[test]
    fn failed_display_carries_the_reason() {
        let outcome = Outcome::Failed(String::from("source not found"));
        assert_eq!(outcome.to_string(), "failed: source not found");
        assert_eq!(outcome.as_str(), "failed");
    }
}
