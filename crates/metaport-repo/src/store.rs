//! Metadata store trait definition.
//!
//! [`MetadataStore`] defines the storage contract the export and import
//! engines work against. Model types live in `metaport_types::entity`; local
//! ids exist only on this side of the document boundary.

use metaport_types::entity::{Job, JobName, Link, LinkName, Submission};

use crate::error;

/// Surrogate key assigned by the store when an entity is persisted.
///
/// Local to one repository instance; never portable.
pub type LocalId = i64;

/// Storage contract for repository metadata.
///
/// Implementations must be `Send + Sync` for use behind `&dyn MetadataStore`.
/// Reads are point-in-time without a long-lived lock; writes of one entity
/// must be atomic with respect to the unique-name constraint so concurrent
/// same-named creation surfaces as [`StoreError::DuplicateName`]
/// (`crate::StoreError::DuplicateName`), never a silent overwrite.
pub trait MetadataStore: Send + Sync {
    /// List all links.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    fn list_links(&self) -> error::Result<Vec<Link>>;

    /// List all jobs, with link references rendered as names.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    fn list_jobs(&self) -> error::Result<Vec<Job>>;

    /// List all submissions, with job references rendered as names.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    fn list_submissions(&self) -> error::Result<Vec<Submission>>;

    /// Find a link by name.
    ///
    /// Returns `Ok(None)` when no such link exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    fn find_link(&self, name: &LinkName) -> error::Result<Option<(LocalId, Link)>>;

    /// Resolve a job name to its local id.
    ///
    /// Returns `Ok(None)` when no such job exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    fn find_job_id(&self, name: &JobName) -> error::Result<Option<LocalId>>;

    /// Find a submission of `job` by its identity key: creation timestamp
    /// plus optional external execution id. Submissions have no unique name,
    /// so this is what duplicate detection keys on.
    ///
    /// Returns `Ok(None)` when no matching submission exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    fn find_submission(
        &self,
        job: LocalId,
        created_at: &str,
        external_id: Option<&str>,
    ) -> error::Result<Option<LocalId>>;

    /// Persist a link, assigning a fresh local id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateName`](crate::StoreError::DuplicateName)
    /// when a link of the same name exists, or another
    /// [`StoreError`](crate::StoreError) on storage failure.
    fn create_link(&self, link: &Link) -> error::Result<LocalId>;

    /// Persist a job whose link references have been resolved to local ids.
    ///
    /// # Errors
    ///
    /// Same policy as [`create_link`](MetadataStore::create_link).
    fn create_job(&self, job: &Job, from_link: LocalId, to_link: LocalId)
        -> error::Result<LocalId>;

    /// Persist a submission whose job reference has been resolved.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    fn create_submission(&self, submission: &Submission, job: LocalId) -> error::Result<LocalId>;
}
