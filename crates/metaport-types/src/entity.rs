//! Entity model for repository metadata.
//!
//! Records are ephemeral: the export engine builds them from a store
//! snapshot, the import engine builds them from a parsed artifact. Local
//! store ids never appear here; entities are identified by name within
//! their type, and cross-entity references are name-based.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigPayload, ConfigSchema};

// ---------------------------------------------------------------------------
// Name newtypes
// ---------------------------------------------------------------------------

/// Unique connector name (e.g. `"hdfs-connector"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectorName(String);

impl ConnectorName {
    /// Create a new connector name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConnectorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Into<String>> From<S> for ConnectorName {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

/// Unique link name within one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkName(String);

impl LinkName {
    /// Create a new link name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LinkName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Into<String>> From<S> for LinkName {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

/// Unique job name within one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(String);

impl JobName {
    /// Create a new job name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Into<String>> From<S> for JobName {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// A registered connector: identity plus the config schemas it declares for
/// links and jobs that use it.
///
/// Connectors are supplied by the live registry of the running deployment.
/// They are never created by import; imported entities only reference them
/// by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub name: ConnectorName,
    /// Connector build version, compared for drift warnings at import.
    pub version: String,
    /// Schema for link configs bound to this connector.
    #[serde(default)]
    pub link_config: ConfigSchema,
    /// Schema for per-direction job configs bound to this connector.
    #[serde(default)]
    pub job_config: ConfigSchema,
}

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// A named, configured connection to an external system via one connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub name: LinkName,
    pub connector_name: ConnectorName,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub config: ConfigPayload,
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// A named pairing of a source link and a destination link plus
/// transfer-specific configuration.
///
/// `from_link_name` and `to_link_name` may name the same link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub name: JobName,
    pub from_link_name: LinkName,
    pub to_link_name: LinkName,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub from_config: ConfigPayload,
    pub to_config: ConfigPayload,
    pub driver_config: ConfigPayload,
}

fn default_enabled() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Lifecycle status of one job execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Booting,
    Running,
    Succeeded,
    Failed,
    Stopped,
    Unknown,
}

impl SubmissionStatus {
    /// Wire-format string for storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Booting => "BOOTING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Stopped => "STOPPED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse a stored status string. Unrecognized values map to `Unknown`
    /// so rows written by a newer build still load.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "BOOTING" => Self::Booting,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "STOPPED" => Self::Stopped,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One execution attempt of a job.
///
/// `progress` is `None` when unknown (e.g. terminal submissions). Timestamps
/// are ISO-8601 UTC strings; stores handle their own internal formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub job_name: JobName,
    pub status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Execution-engine counters, e.g. `{"rows-read": 1000}`.
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub counters: std::collections::BTreeMap<String, i64>,
    /// Identifier assigned by the external execution engine, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_summary: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigPayload;

    #[test]
    fn link_name_display_and_as_str() {
        let name = LinkName::new("hdfsLink1");
        assert_eq!(name.as_str(), "hdfsLink1");
        assert_eq!(name.to_string(), "hdfsLink1");
    }

    #[test]
    fn names_eq_and_hash_by_value() {
        use std::collections::HashSet;
        let a = JobName::new("jobName");
        let b = JobName::from("jobName");
        assert_eq!(a, b);
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn connector_name_serde_transparent() {
        let name = ConnectorName::new("hdfs-connector");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"hdfs-connector\"");
    }

    #[test]
    fn submission_status_as_str_parse_roundtrip() {
        for status in [
            SubmissionStatus::Booting,
            SubmissionStatus::Running,
            SubmissionStatus::Succeeded,
            SubmissionStatus::Failed,
            SubmissionStatus::Stopped,
            SubmissionStatus::Unknown,
        ] {
            assert_eq!(SubmissionStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn submission_status_unrecognized_maps_to_unknown() {
        assert_eq!(
            SubmissionStatus::parse("NEVER_EXECUTED"),
            SubmissionStatus::Unknown
        );
    }

    #[test]
    fn submission_status_wire_format_is_screaming() {
        let json = serde_json::to_string(&SubmissionStatus::Succeeded).unwrap();
        assert_eq!(json, "\"SUCCEEDED\"");
    }

    #[test]
    fn job_wire_fields_are_camel_case() {
        let job = Job {
            name: JobName::new("jobName"),
            from_link_name: LinkName::new("a"),
            to_link_name: LinkName::new("b"),
            enabled: true,
            from_config: ConfigPayload::default(),
            to_config: ConfigPayload::default(),
            driver_config: ConfigPayload::default(),
        };
        let json = serde_json::to_value(&job).unwrap();
        assert!(json.get("fromLinkName").is_some());
        assert!(json.get("toLinkName").is_some());
        assert!(json.get("driverConfig").is_some());
    }

    #[test]
    fn link_enabled_defaults_to_true() {
        let json = r#"{"name":"l1","connectorName":"c1","config":[]}"#;
        let link: Link = serde_json::from_str(json).unwrap();
        assert!(link.enabled);
    }

    #[test]
    fn submission_serde_roundtrip() {
        let sub = Submission {
            job_name: JobName::new("jobName"),
            status: SubmissionStatus::Succeeded,
            progress: None,
            counters: [("rows-read".to_string(), 1000)].into_iter().collect(),
            external_id: Some("job_1432".to_string()),
            error_summary: None,
            created_at: "2026-01-15T10:00:00Z".into(),
            updated_at: "2026-01-15T10:05:00Z".into(),
        };
        let json = serde_json::to_string(&sub).unwrap();
        let back: Submission = serde_json::from_str(&json).unwrap();
        assert_eq!(sub, back);
    }
}
