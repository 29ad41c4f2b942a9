//! Non-fatal findings collected during a run
//!
//! Every finding is logged at `warn` when it is recorded and kept so the
//! caller can count or print them after the run completes.

use serde::Serialize;
use std::fmt;

use crate::models::Level;

/// A recoverable data-quality finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A later row reused an id already present at this level
    DuplicateId { level: Level, id: String },
    /// A link names a target that does not exist in the parent level
    DanglingLink {
        source_level: Level,
        source_id: String,
        target_level: Level,
        target_id: String,
    },
    /// The same source was registered twice on one target
    DuplicateLink {
        target_level: Level,
        target_id: String,
        source_id: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateId { level, id } => {
                write!(f, "Duplicate {} id {} (later row wins)", level, id)
            }
            Diagnostic::DanglingLink {
                source_level,
                source_id,
                target_level,
                target_id,
            } => write!(
                f,
                "Link {}/{} target does not exist: {}/{}",
                source_level, source_id, target_level, target_id
            ),
            Diagnostic::DuplicateLink {
                target_level,
                target_id,
                source_id,
            } => write!(
                f,
                "Link to {}/{} already present: {}",
                target_level, target_id, source_id
            ),
        }
    }
}

/// Ordered collection of findings for one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs and records a finding
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn duplicate_ids(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::DuplicateId { .. }))
    }

    pub fn dangling_links(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::DanglingLink { .. }))
    }

    pub fn duplicate_links(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::DuplicateLink { .. }))
    }

    fn count(&self, pred: impl Fn(&Diagnostic) -> bool) -> usize {
        self.entries.iter().filter(|d| pred(d)).count()
    }
}
