//! Import outcome report.
//!
//! Enumerates entities imported successfully and entities rejected with a
//! reason per rejection, suitable for literal assertion in tests and for
//! rendering a per-entity CLI summary.

use serde::Serialize;

/// Entity type of a report entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Link,
    Job,
    Submission,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Link => "link",
            Self::Job => "job",
            Self::Submission => "submission",
        };
        f.write_str(s)
    }
}

/// One rejected entity and why.
///
/// Submissions are identified by the name of the job they belong to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub kind: EntityKind,
    pub name: String,
    pub reason: String,
}

/// Outcome of one import attempt.
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub links_imported: Vec<String>,
    pub jobs_imported: Vec<String>,
    /// Job names of imported submissions, in artifact order.
    pub submissions_imported: Vec<String>,
    pub rejections: Vec<Rejection>,
    /// Set when atomic mode aborted before persisting anything.
    pub aborted: bool,
}

impl ImportReport {
    /// Total entities persisted.
    #[must_use]
    pub fn imported_count(&self) -> usize {
        self.links_imported.len() + self.jobs_imported.len() + self.submissions_imported.len()
    }

    /// True when nothing was rejected.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty()
    }

    /// Record a rejection and log it.
    pub fn reject(&mut self, kind: EntityKind, name: impl Into<String>, reason: impl Into<String>) {
        let name = name.into();
        let reason = reason.into();
        tracing::warn!(entity = %kind, name = %name, reason = %reason, "Entity rejected");
        self.rejections.push(Rejection { kind, name, reason });
    }

    /// The rejection recorded for `name`, if any.
    #[must_use]
    pub fn rejection_for(&self, kind: EntityKind, name: &str) -> Option<&Rejection> {
        self.rejections
            .iter()
            .find(|r| r.kind == kind && r.name == name)
    }
}
