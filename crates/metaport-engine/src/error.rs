//! Fatal error taxonomy for export and import.
//!
//! Only unrecoverable conditions surface as `Err`: structural decode
//! failures, version incompatibility, source-read failures, and store
//! infrastructure faults. Entity-scoped failures (unresolved references,
//! validation rejections, duplicate names) are collected into the
//! [`ImportReport`](crate::ImportReport) instead.

use metaport_repo::StoreError;

/// Fatal import failure; nothing was persisted.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Artifact bytes do not parse into the envelope shape.
    #[error("malformed artifact: {0}")]
    Structural(#[source] serde_json::Error),

    /// Envelope version outside the supported set.
    #[error("artifact version '{found}' is not supported (supported: {supported})")]
    VersionIncompatible { found: String, supported: String },

    /// Target store infrastructure failure (not a per-entity write conflict).
    #[error("repository store failure: {0}")]
    Store(#[from] StoreError),
}

/// Fatal export failure; no artifact was produced.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Source repository unreadable.
    #[error("repository read failed: {0}")]
    SourceRead(#[from] StoreError),

    /// Entity graph could not be encoded.
    #[error("artifact encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_error_names_both_sides() {
        let err = ImportError::VersionIncompatible {
            found: "0.9".into(),
            supported: "1.0".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'0.9'"));
        assert!(msg.contains("1.0"));
    }

    #[test]
    fn structural_error_wraps_serde() {
        let inner = serde_json::from_str::<i64>("notjson").unwrap_err();
        let err = ImportError::Structural(inner);
        assert!(err.to_string().starts_with("malformed artifact"));
    }

    #[test]
    fn store_error_converts() {
        let err: ImportError = StoreError::LockPoisoned.into();
        assert!(matches!(err, ImportError::Store(_)));
    }
}
