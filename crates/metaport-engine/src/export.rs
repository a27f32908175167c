//! Export engine: repository snapshot to stamped artifact document.

use chrono::{SecondsFormat, Utc};
use metaport_repo::MetadataStore;
use metaport_types::document::{
    DocumentMetadata, JobsSection, LinksSection, RepositoryDocument, SubmissionsSection,
    CURRENT_FORMAT_VERSION,
};
use metaport_types::entity::Submission;

use crate::error::ExportError;

/// Export the full repository state.
///
/// Reads every link, job, and submission; the source repository is never
/// mutated. The read is an implicit point-in-time snapshot without a
/// long-lived lock.
///
/// # Errors
///
/// Returns [`ExportError::SourceRead`] if the repository is unreadable.
pub fn export(store: &dyn MetadataStore) -> Result<RepositoryDocument, ExportError> {
    export_filtered(store, &|_| true)
}

/// Export with a caller-supplied submission predicate (e.g. only
/// submissions of one job). Links and jobs are always exported in full.
///
/// # Errors
///
/// Returns [`ExportError::SourceRead`] if the repository is unreadable.
pub fn export_filtered(
    store: &dyn MetadataStore,
    submission_filter: &dyn Fn(&Submission) -> bool,
) -> Result<RepositoryDocument, ExportError> {
    let links = store.list_links()?;
    let jobs = store.list_jobs()?;
    let submissions: Vec<Submission> = store
        .list_submissions()?
        .into_iter()
        .filter(|s| submission_filter(s))
        .collect();

    tracing::info!(
        links = links.len(),
        jobs = jobs.len(),
        submissions = submissions.len(),
        version = CURRENT_FORMAT_VERSION,
        "Exported repository snapshot"
    );

    Ok(RepositoryDocument {
        metadata: DocumentMetadata {
            version: CURRENT_FORMAT_VERSION.to_string(),
            generated: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        },
        links: LinksSection { link: links },
        jobs: JobsSection { job: jobs },
        submissions: SubmissionsSection {
            submission: submissions,
        },
    })
}
