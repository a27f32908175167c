//! Versioned document envelope: the portable artifact format.
//!
//! The envelope wraps one section per entity type. Sections are
//! order-preserving and reference other entities by name only; local store
//! ids never cross the document boundary.

use serde::{Deserialize, Serialize};

use crate::entity::{Job, Link, Submission};

/// Compatibility version stamped into every artifact this build produces.
pub const CURRENT_FORMAT_VERSION: &str = "1.0";

/// Envelope metadata: compatibility contract plus provenance.
///
/// `version` is required: an artifact that does not declare one fails to
/// decode rather than slipping past the version gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Compatibility version string, checked against the importing build's
    /// supported set before anything else is looked at.
    pub version: String,
    /// ISO-8601 UTC generation timestamp.
    pub generated: String,
}

/// `links` section: `{"link": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinksSection {
    pub link: Vec<Link>,
}

/// `jobs` section: `{"job": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobsSection {
    pub job: Vec<Job>,
}

/// `submissions` section: `{"submission": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionsSection {
    pub submission: Vec<Submission>,
}

/// The complete portable document.
///
/// Immutable once written; read at most once per import attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryDocument {
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub links: LinksSection,
    #[serde(default)]
    pub jobs: JobsSection,
    #[serde(default)]
    pub submissions: SubmissionsSection,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigPayload;
    use crate::entity::{ConnectorName, Link, LinkName};

    fn doc() -> RepositoryDocument {
        RepositoryDocument {
            metadata: DocumentMetadata {
                version: CURRENT_FORMAT_VERSION.to_string(),
                generated: "2026-01-15T10:00:00Z".to_string(),
            },
            links: LinksSection {
                link: vec![Link {
                    name: LinkName::new("hdfsLink1"),
                    connector_name: ConnectorName::new("hdfs-connector"),
                    enabled: true,
                    config: ConfigPayload::default(),
                }],
            },
            jobs: JobsSection::default(),
            submissions: SubmissionsSection::default(),
        }
    }

    #[test]
    fn envelope_has_singular_section_keys() {
        let json = serde_json::to_value(doc()).unwrap();
        assert!(json["links"]["link"].is_array());
        assert!(json["jobs"]["job"].is_array());
        assert!(json["submissions"]["submission"].is_array());
        assert_eq!(json["metadata"]["version"], CURRENT_FORMAT_VERSION);
    }

    #[test]
    fn envelope_roundtrip() {
        let d = doc();
        let json = serde_json::to_string_pretty(&d).unwrap();
        let back: RepositoryDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let json = r#"{"metadata":{"version":"1.0","generated":"2026-01-15T10:00:00Z"}}"#;
        let d: RepositoryDocument = serde_json::from_str(json).unwrap();
        assert!(d.links.link.is_empty());
        assert!(d.jobs.job.is_empty());
        assert!(d.submissions.submission.is_empty());
    }

    #[test]
    fn missing_version_fails_to_decode() {
        let json = r#"{"metadata":{"generated":"2026-01-15T10:00:00Z"}}"#;
        let err = serde_json::from_str::<RepositoryDocument>(json)
            .expect_err("version-less artifact must not decode");
        assert!(err.to_string().contains("version"));
    }
}
