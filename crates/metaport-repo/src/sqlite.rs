//! `SQLite`-backed implementation of [`MetadataStore`].
//!
//! Uses a single `Mutex<Connection>` for thread safety. Cross-entity
//! references are stored as foreign keys on local ids; names are unique per
//! entity type and are the only identity that leaves this crate.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use metaport_types::config::ConfigPayload;
use metaport_types::entity::{Job, JobName, Link, LinkName, Submission, SubmissionStatus};
use rusqlite::Connection;

use crate::error::{self, StoreError};
use crate::store::{LocalId, MetadataStore};

/// `SQLite` datetime format (UTC, no timezone suffix).
const SQLITE_DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Idempotent DDL for metadata tables.
const CREATE_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    connector_name TEXT NOT NULL,
    enabled INTEGER NOT NULL DEFAULT 1,
    config_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    from_link_id INTEGER NOT NULL REFERENCES links(id),
    to_link_id INTEGER NOT NULL REFERENCES links(id),
    enabled INTEGER NOT NULL DEFAULT 1,
    from_config_json TEXT NOT NULL,
    to_config_json TEXT NOT NULL,
    driver_config_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS submissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id INTEGER NOT NULL REFERENCES jobs(id),
    status TEXT NOT NULL,
    progress REAL,
    external_id TEXT,
    error_summary TEXT,
    counters_json TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_submissions_job ON submissions (job_id);
";

/// `SQLite`-backed metadata storage.
///
/// Create with [`SqliteMetadataStore::open`] for file-backed persistence or
/// [`SqliteMetadataStore::in_memory`] for tests.
pub struct SqliteMetadataStore {
    conn: Mutex<Connection>,
}

impl SqliteMetadataStore {
    /// Open or create a `SQLite` metadata database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory can't be created, or
    /// [`StoreError::Sqlite`] if the database can't be opened.
    pub fn open(path: &Path) -> error::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(CREATE_TABLES)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory `SQLite` store (for testing).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] if the in-memory database can't be
    /// initialized.
    pub fn in_memory() -> error::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_TABLES)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the connection lock.
    fn lock_conn(&self) -> error::Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Map a unique-constraint failure to [`StoreError::DuplicateName`].
    fn map_insert_err(kind: &'static str, name: &str, err: rusqlite::Error) -> StoreError {
        match err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::DuplicateName {
                    kind,
                    name: name.to_string(),
                }
            }
            other => StoreError::Sqlite(other),
        }
    }

    /// Convert a `SQLite` datetime string to ISO-8601.
    fn sqlite_to_iso8601(raw: &str) -> String {
        NaiveDateTime::parse_from_str(raw, SQLITE_DATETIME_FMT).map_or_else(
            |_| raw.to_string(),
            |ndt| format!("{}Z", ndt.format("%Y-%m-%dT%H:%M:%S")),
        )
    }

    /// Convert an ISO-8601 string to `SQLite` datetime format.
    fn iso8601_to_sqlite(iso: &str) -> String {
        chrono::DateTime::parse_from_rfc3339(iso).map_or_else(
            |_| iso.to_string(),
            |dt| dt.format(SQLITE_DATETIME_FMT).to_string(),
        )
    }
}

impl MetadataStore for SqliteMetadataStore {
    fn list_links(&self) -> error::Result<Vec<Link>> {
        let conn = self.lock_conn()?;
        let mut stmt =
            conn.prepare("SELECT name, connector_name, enabled, config_json FROM links ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut links = Vec::new();
        for row in rows {
            let (name, connector_name, enabled, config_json) = row?;
            links.push(Link {
                name: LinkName::new(name),
                connector_name: connector_name.into(),
                enabled,
                config: serde_json::from_str(&config_json)?,
            });
        }
        Ok(links)
    }

    fn list_jobs(&self) -> error::Result<Vec<Job>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT j.name, lf.name, lt.name, j.enabled, \
                    j.from_config_json, j.to_config_json, j.driver_config_json \
             FROM jobs j \
             JOIN links lf ON j.from_link_id = lf.id \
             JOIN links lt ON j.to_link_id = lt.id \
             ORDER BY j.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut jobs = Vec::new();
        for row in rows {
            let (name, from_link, to_link, enabled, from_json, to_json, driver_json) = row?;
            jobs.push(Job {
                name: JobName::new(name),
                from_link_name: LinkName::new(from_link),
                to_link_name: LinkName::new(to_link),
                enabled,
                from_config: serde_json::from_str(&from_json)?,
                to_config: serde_json::from_str(&to_json)?,
                driver_config: serde_json::from_str(&driver_json)?,
            });
        }
        Ok(jobs)
    }

    fn list_submissions(&self) -> error::Result<Vec<Submission>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT j.name, s.status, s.progress, s.external_id, s.error_summary, \
                    s.counters_json, s.created_at, s.updated_at \
             FROM submissions s \
             JOIN jobs j ON s.job_id = j.id \
             ORDER BY s.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<f64>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut submissions = Vec::new();
        for row in rows {
            let (job, status, progress, external_id, error_summary, counters, created, updated) =
                row?;
            let counters: BTreeMap<String, i64> = serde_json::from_str(&counters)?;
            submissions.push(Submission {
                job_name: JobName::new(job),
                status: SubmissionStatus::parse(&status),
                progress,
                counters,
                external_id,
                error_summary,
                created_at: Self::sqlite_to_iso8601(&created),
                updated_at: Self::sqlite_to_iso8601(&updated),
            });
        }
        Ok(submissions)
    }

    fn find_link(&self, name: &LinkName) -> error::Result<Option<(LocalId, Link)>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, connector_name, enabled, config_json FROM links WHERE name = ?1",
        )?;
        let result = stmt.query_row([name.as_str()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, String>(3)?,
            ))
        });

        match result {
            Ok((id, connector_name, enabled, config_json)) => Ok(Some((
                id,
                Link {
                    name: name.clone(),
                    connector_name: connector_name.into(),
                    enabled,
                    config: serde_json::from_str(&config_json)?,
                },
            ))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Sqlite(e)),
        }
    }

    fn find_job_id(&self, name: &JobName) -> error::Result<Option<LocalId>> {
        let conn = self.lock_conn()?;
        let result = conn.query_row(
            "SELECT id FROM jobs WHERE name = ?1",
            [name.as_str()],
            |row| row.get::<_, i64>(0),
        );
        match result {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Sqlite(e)),
        }
    }

    fn find_submission(
        &self,
        job: LocalId,
        created_at: &str,
        external_id: Option<&str>,
    ) -> error::Result<Option<LocalId>> {
        let conn = self.lock_conn()?;
        // IS instead of = so a NULL external_id matches NULL
        let result = conn.query_row(
            "SELECT id FROM submissions \
             WHERE job_id = ?1 AND created_at = ?2 AND external_id IS ?3",
            rusqlite::params![job, Self::iso8601_to_sqlite(created_at), external_id],
            |row| row.get::<_, i64>(0),
        );
        match result {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Sqlite(e)),
        }
    }

    fn create_link(&self, link: &Link) -> error::Result<LocalId> {
        let config_json = serde_json::to_string(&link.config)?;
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO links (name, connector_name, enabled, config_json) \
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                link.name.as_str(),
                link.connector_name.as_str(),
                link.enabled,
                config_json,
            ],
        )
        .map_err(|e| Self::map_insert_err("link", link.name.as_str(), e))?;
        Ok(conn.last_insert_rowid())
    }

    fn create_job(
        &self,
        job: &Job,
        from_link: LocalId,
        to_link: LocalId,
    ) -> error::Result<LocalId> {
        let from_json = serde_json::to_string(&job.from_config)?;
        let to_json = serde_json::to_string(&job.to_config)?;
        let driver_json = serde_json::to_string(&job.driver_config)?;
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO jobs (name, from_link_id, to_link_id, enabled, \
                               from_config_json, to_config_json, driver_config_json) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                job.name.as_str(),
                from_link,
                to_link,
                job.enabled,
                from_json,
                to_json,
                driver_json,
            ],
        )
        .map_err(|e| Self::map_insert_err("job", job.name.as_str(), e))?;
        Ok(conn.last_insert_rowid())
    }

    fn create_submission(&self, submission: &Submission, job: LocalId) -> error::Result<LocalId> {
        let counters_json = serde_json::to_string(&submission.counters)?;
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO submissions (job_id, status, progress, external_id, error_summary, \
                                      counters_json, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                job,
                submission.status.as_str(),
                submission.progress,
                submission.external_id,
                submission.error_summary,
                counters_json,
                Self::iso8601_to_sqlite(&submission.created_at),
                Self::iso8601_to_sqlite(&submission.updated_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaport_types::config::{ConfigEntry, ConfigGroup, ConfigValue};

    fn link(name: &str) -> Link {
        Link {
            name: LinkName::new(name),
            connector_name: "hdfs-connector".into(),
            enabled: true,
            config: ConfigPayload {
                groups: vec![ConfigGroup {
                    name: "linkConfig".into(),
                    inputs: vec![ConfigEntry {
                        name: "uri".into(),
                        value: ConfigValue::Text("hdfs://namenode:8020".into()),
                    }],
                }],
            },
        }
    }

    fn job(name: &str, from: &str, to: &str) -> Job {
        Job {
            name: JobName::new(name),
            from_link_name: LinkName::new(from),
            to_link_name: LinkName::new(to),
            enabled: true,
            from_config: ConfigPayload::default(),
            to_config: ConfigPayload::default(),
            driver_config: ConfigPayload::default(),
        }
    }

    fn submission(job: &str, status: SubmissionStatus) -> Submission {
        Submission {
            job_name: JobName::new(job),
            status,
            progress: Some(1.0),
            counters: [("rows-written".to_string(), 42)].into_iter().collect(),
            external_id: None,
            error_summary: None,
            created_at: "2026-01-15T10:00:00Z".into(),
            updated_at: "2026-01-15T10:05:00Z".into(),
        }
    }

    #[test]
    fn link_roundtrip() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        let id = store.create_link(&link("hdfsLink1")).unwrap();
        assert!(id > 0);

        let links = store.list_links().unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0], link("hdfsLink1"));

        let (found_id, found) = store
            .find_link(&LinkName::new("hdfsLink1"))
            .unwrap()
            .unwrap();
        assert_eq!(found_id, id);
        assert_eq!(found.connector_name.as_str(), "hdfs-connector");
    }

    #[test]
    fn find_link_missing_is_none() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        assert!(store.find_link(&LinkName::new("nope")).unwrap().is_none());
    }

    #[test]
    fn duplicate_link_name_is_rejected() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        store.create_link(&link("hdfsLink1")).unwrap();
        let err = store
            .create_link(&link("hdfsLink1"))
            .expect_err("duplicate name should fail");
        assert!(err.is_duplicate_name());
        assert_eq!(err.to_string(), "link 'hdfsLink1' already exists");

        // Original row untouched
        assert_eq!(store.list_links().unwrap().len(), 1);
    }

    #[test]
    fn job_roundtrip_renders_link_names() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        let from = store.create_link(&link("hdfsLink1")).unwrap();
        let to = store.create_link(&link("hdfsLink2")).unwrap();
        store.create_job(&job("jobName", "hdfsLink1", "hdfsLink2"), from, to).unwrap();

        let jobs = store.list_jobs().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].from_link_name.as_str(), "hdfsLink1");
        assert_eq!(jobs[0].to_link_name.as_str(), "hdfsLink2");
    }

    #[test]
    fn self_loop_job_allowed() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        let id = store.create_link(&link("solo")).unwrap();
        store.create_job(&job("loop", "solo", "solo"), id, id).unwrap();
        let jobs = store.list_jobs().unwrap();
        assert_eq!(jobs[0].from_link_name, jobs[0].to_link_name);
    }

    #[test]
    fn duplicate_job_name_is_rejected() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        let id = store.create_link(&link("l")).unwrap();
        store.create_job(&job("j", "l", "l"), id, id).unwrap();
        let err = store
            .create_job(&job("j", "l", "l"), id, id)
            .expect_err("duplicate name should fail");
        assert!(err.is_duplicate_name());
    }

    #[test]
    fn submission_roundtrip_renders_job_name() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        let lid = store.create_link(&link("l")).unwrap();
        let jid = store.create_job(&job("jobName", "l", "l"), lid, lid).unwrap();
        store
            .create_submission(&submission("jobName", SubmissionStatus::Succeeded), jid)
            .unwrap();

        let subs = store.list_submissions().unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].job_name.as_str(), "jobName");
        assert_eq!(subs[0].status, SubmissionStatus::Succeeded);
        assert_eq!(subs[0].counters["rows-written"], 42);
        assert_eq!(subs[0].created_at, "2026-01-15T10:00:00Z");
    }

    #[test]
    fn find_submission_keys_on_timestamp_and_external_id() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        let lid = store.create_link(&link("l")).unwrap();
        let jid = store.create_job(&job("j", "l", "l"), lid, lid).unwrap();
        let sub = Submission {
            external_id: Some("job_1432".to_string()),
            ..submission("j", SubmissionStatus::Succeeded)
        };
        let id = store.create_submission(&sub, jid).unwrap();

        let found = store
            .find_submission(jid, &sub.created_at, sub.external_id.as_deref())
            .unwrap();
        assert_eq!(found, Some(id));

        assert!(store
            .find_submission(jid, "2030-01-01T00:00:00Z", sub.external_id.as_deref())
            .unwrap()
            .is_none());
        assert!(store
            .find_submission(jid, &sub.created_at, Some("other-id"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn find_submission_matches_null_external_id() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        let lid = store.create_link(&link("l")).unwrap();
        let jid = store.create_job(&job("j", "l", "l"), lid, lid).unwrap();
        let sub = Submission {
            external_id: None,
            ..submission("j", SubmissionStatus::Succeeded)
        };
        let id = store.create_submission(&sub, jid).unwrap();

        assert_eq!(
            store.find_submission(jid, &sub.created_at, None).unwrap(),
            Some(id)
        );
    }

    #[test]
    fn submissions_preserve_insertion_order() {
        let store = SqliteMetadataStore::in_memory().unwrap();
        let lid = store.create_link(&link("l")).unwrap();
        let jid = store.create_job(&job("j", "l", "l"), lid, lid).unwrap();
        store
            .create_submission(&submission("j", SubmissionStatus::Failed), jid)
            .unwrap();
        store
            .create_submission(&submission("j", SubmissionStatus::Succeeded), jid)
            .unwrap();

        let subs = store.list_submissions().unwrap();
        assert_eq!(subs[0].status, SubmissionStatus::Failed);
        assert_eq!(subs[1].status, SubmissionStatus::Succeeded);
    }

    #[test]
    fn file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("repo").join("metadata.db");
        {
            let store = SqliteMetadataStore::open(&db_path).unwrap();
            store.create_link(&link("hdfsLink1")).unwrap();
        }
        let store = SqliteMetadataStore::open(&db_path).unwrap();
        assert_eq!(store.list_links().unwrap().len(), 1);
    }

    #[test]
    fn datetime_conversion_helpers() {
        assert_eq!(
            SqliteMetadataStore::sqlite_to_iso8601("2026-01-15 10:00:00"),
            "2026-01-15T10:00:00Z"
        );
        assert_eq!(
            SqliteMetadataStore::iso8601_to_sqlite("2026-01-15T10:00:00Z"),
            "2026-01-15 10:00:00"
        );
    }
}
