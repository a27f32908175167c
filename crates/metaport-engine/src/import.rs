//! Import engine: artifact document to repository state.
//!
//! The pipeline runs in dependency order over [`IMPORT_STAGES`]: links,
//! then jobs, then submissions. Each entity is independently substituted,
//! resolved, validated, and persisted; a failing entity is recorded in the
//! [`ImportReport`] and the run continues. Only structural, version, and
//! store infrastructure failures abort the whole import.
//!
//! Atomic mode runs a full preflight pass first, resolving references
//! against a [`PendingNames`] overlay so entities may reference earlier
//! entities of the same artifact. Any rejection aborts before a single
//! write; the report carries the rejections with `aborted` set.

use metaport_repo::MetadataStore;
use metaport_types::config::ConfigSchema;
use metaport_types::document::RepositoryDocument;
use metaport_types::entity::{Job, Link, Submission};
use metaport_types::violation::Violation;

use crate::error::ImportError;
use crate::placeholder::{PlaceholderError, Substitutions};
use crate::registry::{validate_payload, ConfigAspect, ConnectorRegistry};
use crate::report::{EntityKind, ImportReport};
use crate::resolve::{resolve_job, resolve_link, ImportStage, PendingNames, IMPORT_STAGES};
use crate::version::VersionPolicy;

/// Import behavior knobs.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Reject the whole artifact if any entity would be rejected.
    pub atomic: bool,
    /// Accepted artifact format versions.
    pub version_policy: VersionPolicy,
}

/// Import an artifact document into the target repository.
///
/// The version gate runs before any entity is looked at. Entities are then
/// processed per [`IMPORT_STAGES`]; every accepted entity is persisted with
/// a fresh local id, and every rejected entity lands in the report with a
/// reason. Re-importing the same artifact rejects every entity as a
/// duplicate and persists nothing new: links and jobs by unique name,
/// submissions by their identity key (job, creation timestamp, external id).
///
/// # Errors
///
/// Returns [`ImportError::VersionIncompatible`] when the envelope version
/// is outside the policy, or [`ImportError::Store`] on store infrastructure
/// failure. Per-entity failures never surface as `Err`.
pub fn import(
    store: &dyn MetadataStore,
    registry: &dyn ConnectorRegistry,
    document: &RepositoryDocument,
    substitutions: &Substitutions,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    options.version_policy.check(&document.metadata.version)?;

    let mut report = ImportReport::default();
    let ctx = ImportContext {
        store,
        registry,
        substitutions,
    };

    if options.atomic {
        ctx.preflight(document, &mut report)?;
        if !report.is_clean() {
            report.aborted = true;
            tracing::warn!(
                rejections = report.rejections.len(),
                "Atomic import aborted, nothing was persisted"
            );
            return Ok(report);
        }
    }

    for stage in IMPORT_STAGES {
        tracing::info!(stage = %stage, "Import stage starting");
        match stage {
            ImportStage::Links => ctx.import_links(&document.links.link, &mut report)?,
            ImportStage::Jobs => ctx.import_jobs(&document.jobs.job, &mut report)?,
            ImportStage::Submissions => {
                ctx.import_submissions(&document.submissions.submission, &mut report)?;
            }
        }
    }

    tracing::info!(
        links = report.links_imported.len(),
        jobs = report.jobs_imported.len(),
        submissions = report.submissions_imported.len(),
        rejections = report.rejections.len(),
        "Import finished"
    );
    Ok(report)
}

struct ImportContext<'a> {
    store: &'a dyn MetadataStore,
    registry: &'a dyn ConnectorRegistry,
    substitutions: &'a Substitutions,
}

impl ImportContext<'_> {
    // -----------------------------------------------------------------------
    // Persisting passes
    // -----------------------------------------------------------------------

    fn import_links(&self, links: &[Link], report: &mut ImportReport) -> Result<(), ImportError> {
        for link in links {
            let link = match self.substituted_link(link) {
                Ok(link) => link,
                Err(err) => {
                    report.reject(EntityKind::Link, link.name.as_str(), err.to_string());
                    continue;
                }
            };
            let violations =
                self.registry
                    .validate(&link.connector_name, ConfigAspect::Link, &link.config);
            if !violations.is_empty() {
                report.reject(
                    EntityKind::Link,
                    link.name.as_str(),
                    violations_summary(&violations),
                );
                continue;
            }
            match self.store.create_link(&link) {
                Ok(_) => report.links_imported.push(link.name.to_string()),
                Err(err) if err.is_duplicate_name() => {
                    report.reject(EntityKind::Link, link.name.as_str(), err.to_string());
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn import_jobs(&self, jobs: &[Job], report: &mut ImportReport) -> Result<(), ImportError> {
        for job in jobs {
            let job = match self.substituted_job(job) {
                Ok(job) => job,
                Err(err) => {
                    report.reject(EntityKind::Job, job.name.as_str(), err.to_string());
                    continue;
                }
            };

            let Some(from) = resolve_link(self.store, &job.from_link_name)? else {
                report.reject(
                    EntityKind::Job,
                    job.name.as_str(),
                    format!("from link '{}' not found", job.from_link_name),
                );
                continue;
            };
            let Some(to) = resolve_link(self.store, &job.to_link_name)? else {
                report.reject(
                    EntityKind::Job,
                    job.name.as_str(),
                    format!("to link '{}' not found", job.to_link_name),
                );
                continue;
            };

            let mut violations =
                self.registry
                    .validate(&from.connector_name, ConfigAspect::Job, &job.from_config);
            violations.extend(self.registry.validate(
                &to.connector_name,
                ConfigAspect::Job,
                &job.to_config,
            ));
            violations.extend(self.driver_violations(&job));
            if !violations.is_empty() {
                report.reject(
                    EntityKind::Job,
                    job.name.as_str(),
                    violations_summary(&violations),
                );
                continue;
            }

            match self.store.create_job(&job, from.id, to.id) {
                Ok(_) => report.jobs_imported.push(job.name.to_string()),
                Err(err) if err.is_duplicate_name() => {
                    report.reject(EntityKind::Job, job.name.as_str(), err.to_string());
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn import_submissions(
        &self,
        submissions: &[Submission],
        report: &mut ImportReport,
    ) -> Result<(), ImportError> {
        for submission in submissions {
            let Some(job_id) = resolve_job(self.store, &submission.job_name)? else {
                report.reject(
                    EntityKind::Submission,
                    submission.job_name.as_str(),
                    format!("job '{}' not found", submission.job_name),
                );
                continue;
            };
            if self
                .store
                .find_submission(job_id, &submission.created_at, submission.external_id.as_deref())?
                .is_some()
            {
                report.reject(
                    EntityKind::Submission,
                    submission.job_name.as_str(),
                    submission_duplicate_reason(submission),
                );
                continue;
            }
            match self.store.create_submission(submission, job_id) {
                Ok(_) => report
                    .submissions_imported
                    .push(submission.job_name.to_string()),
                Err(err) if err.is_duplicate_name() => {
                    report.reject(
                        EntityKind::Submission,
                        submission.job_name.as_str(),
                        err.to_string(),
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Atomic preflight
    // -----------------------------------------------------------------------

    /// Run the full pipeline without writing, collecting every rejection.
    fn preflight(
        &self,
        document: &RepositoryDocument,
        report: &mut ImportReport,
    ) -> Result<(), ImportError> {
        let mut pending = PendingNames::new();

        for link in &document.links.link {
            let link = match self.substituted_link(link) {
                Ok(link) => link,
                Err(err) => {
                    report.reject(EntityKind::Link, link.name.as_str(), err.to_string());
                    continue;
                }
            };
            let violations =
                self.registry
                    .validate(&link.connector_name, ConfigAspect::Link, &link.config);
            if !violations.is_empty() {
                report.reject(
                    EntityKind::Link,
                    link.name.as_str(),
                    violations_summary(&violations),
                );
                continue;
            }
            if self.store.find_link(&link.name)?.is_some() {
                report.reject(
                    EntityKind::Link,
                    link.name.as_str(),
                    format!("link '{}' already exists", link.name),
                );
                continue;
            }
            pending.accept_link(link.name.clone(), link.connector_name.clone());
        }

        for job in &document.jobs.job {
            let job = match self.substituted_job(job) {
                Ok(job) => job,
                Err(err) => {
                    report.reject(EntityKind::Job, job.name.as_str(), err.to_string());
                    continue;
                }
            };

            let mut violations = Vec::new();
            let mut unresolved = false;
            for (label, link_name, payload) in [
                ("from", &job.from_link_name, &job.from_config),
                ("to", &job.to_link_name, &job.to_config),
            ] {
                match pending.link_connector(self.store, link_name)? {
                    Some(connector) => violations.extend(self.registry.validate(
                        &connector,
                        ConfigAspect::Job,
                        payload,
                    )),
                    None => {
                        report.reject(
                            EntityKind::Job,
                            job.name.as_str(),
                            format!("{label} link '{link_name}' not found"),
                        );
                        unresolved = true;
                        break;
                    }
                }
            }
            if unresolved {
                continue;
            }
            violations.extend(self.driver_violations(&job));
            if !violations.is_empty() {
                report.reject(
                    EntityKind::Job,
                    job.name.as_str(),
                    violations_summary(&violations),
                );
                continue;
            }
            if self.store.find_job_id(&job.name)?.is_some() {
                report.reject(
                    EntityKind::Job,
                    job.name.as_str(),
                    format!("job '{}' already exists", job.name),
                );
                continue;
            }
            pending.accept_job(job.name.clone());
        }

        for submission in &document.submissions.submission {
            if !pending.job_known(self.store, &submission.job_name)? {
                report.reject(
                    EntityKind::Submission,
                    submission.job_name.as_str(),
                    format!("job '{}' not found", submission.job_name),
                );
                continue;
            }
            // Duplicates are only possible under a pre-existing job; jobs
            // accepted from this artifact have no submissions yet.
            if let Some(job_id) = resolve_job(self.store, &submission.job_name)? {
                if self
                    .store
                    .find_submission(
                        job_id,
                        &submission.created_at,
                        submission.external_id.as_deref(),
                    )?
                    .is_some()
                {
                    report.reject(
                        EntityKind::Submission,
                        submission.job_name.as_str(),
                        submission_duplicate_reason(submission),
                    );
                }
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn substituted_link(&self, link: &Link) -> Result<Link, PlaceholderError> {
        let mut link = link.clone();
        self.substitutions.resolve_payload(&mut link.config)?;
        Ok(link)
    }

    fn substituted_job(&self, job: &Job) -> Result<Job, PlaceholderError> {
        let mut job = job.clone();
        self.substitutions.resolve_payload(&mut job.from_config)?;
        self.substitutions.resolve_payload(&mut job.to_config)?;
        self.substitutions.resolve_payload(&mut job.driver_config)?;
        Ok(job)
    }

    /// Driver config is only validated when the deployment declares a
    /// driver schema.
    fn driver_violations(&self, job: &Job) -> Vec<Violation> {
        self.registry
            .driver_config()
            .map_or_else(Vec::new, |schema: &ConfigSchema| {
                validate_payload(schema, &job.driver_config)
            })
    }
}

fn submission_duplicate_reason(submission: &Submission) -> String {
    format!(
        "submission of job '{}' created at {} already exists",
        submission.job_name, submission.created_at
    )
}

fn violations_summary(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
