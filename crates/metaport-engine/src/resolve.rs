//! Name-based reference resolution against the target repository.
//!
//! Import processes entity types in dependency order: links first (their
//! connector must already exist), then jobs (both link names must resolve),
//! then submissions (the job name must resolve). The order is an explicit
//! stage list so the sequence is independently testable and extensible.

use std::collections::{BTreeMap, BTreeSet};

use metaport_repo::{LocalId, MetadataStore, StoreError};
use metaport_types::entity::{ConnectorName, JobName, LinkName};

/// One dependency level of the import pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Links,
    Jobs,
    Submissions,
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Links => "links",
            Self::Jobs => "jobs",
            Self::Submissions => "submissions",
        };
        f.write_str(s)
    }
}

/// Dependency-ordered pipeline stages. A stage's references may only point
/// at entities committed by earlier stages or pre-existing in the target.
pub const IMPORT_STAGES: [ImportStage; 3] =
    [ImportStage::Links, ImportStage::Jobs, ImportStage::Submissions];

/// A link reference resolved to its local id and owning connector.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRef {
    pub id: LocalId,
    pub connector_name: ConnectorName,
}

/// Resolve a link name in the target repository.
///
/// Returns `Ok(None)` when the name does not resolve.
///
/// # Errors
///
/// Returns [`StoreError`] on storage failure.
pub fn resolve_link(
    store: &dyn MetadataStore,
    name: &LinkName,
) -> Result<Option<LinkRef>, StoreError> {
    Ok(store.find_link(name)?.map(|(id, link)| LinkRef {
        id,
        connector_name: link.connector_name,
    }))
}

/// Resolve a job name in the target repository.
///
/// # Errors
///
/// Returns [`StoreError`] on storage failure.
pub fn resolve_job(
    store: &dyn MetadataStore,
    name: &JobName,
) -> Result<Option<LocalId>, StoreError> {
    store.find_job_id(name)
}

/// Names accepted by earlier stages of an atomic preflight but not yet
/// persisted. Resolution consults this overlay before the store, so a job
/// may reference a link arriving in the same artifact.
#[derive(Debug, Default)]
pub struct PendingNames {
    links: BTreeMap<LinkName, ConnectorName>,
    jobs: BTreeSet<JobName>,
}

impl PendingNames {
    /// Empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a link accepted by the link stage.
    pub fn accept_link(&mut self, name: LinkName, connector: ConnectorName) {
        self.links.insert(name, connector);
    }

    /// Record a job accepted by the job stage.
    pub fn accept_job(&mut self, name: JobName) {
        self.jobs.insert(name);
    }

    /// Resolve a link name against the overlay, falling back to the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    pub fn link_connector(
        &self,
        store: &dyn MetadataStore,
        name: &LinkName,
    ) -> Result<Option<ConnectorName>, StoreError> {
        if let Some(connector) = self.links.get(name) {
            return Ok(Some(connector.clone()));
        }
        Ok(resolve_link(store, name)?.map(|r| r.connector_name))
    }

    /// Whether a job name resolves in the overlay or the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    pub fn job_known(&self, store: &dyn MetadataStore, name: &JobName) -> Result<bool, StoreError> {
        if self.jobs.contains(name) {
            return Ok(true);
        }
        Ok(resolve_job(store, name)?.is_some())
    }
}
