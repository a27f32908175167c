//! Structural codec for the artifact envelope.
//!
//! Purely structural: encoding and decoding are deterministic and lossless
//! for the supported value-type set, and decoding rejects malformed shape
//! (missing field, type mismatch) with [`ImportError::Structural`]. Name
//! resolution and config validation happen later, in the import pipeline.

use metaport_types::document::RepositoryDocument;

use crate::error::{ExportError, ImportError};

/// Encode an entity graph into artifact text.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the graph cannot be serialized.
pub fn encode(document: &RepositoryDocument) -> Result<String, ExportError> {
    serde_json::to_string_pretty(document).map_err(ExportError::Encode)
}

/// Decode artifact text into an entity graph.
///
/// # Errors
///
/// Returns [`ImportError::Structural`] if the text does not parse into the
/// envelope shape. Semantic problems (unknown connectors, dangling names)
/// are not detected here.
pub fn decode(raw: &str) -> Result<RepositoryDocument, ImportError> {
    serde_json::from_str(raw).map_err(ImportError::Structural)
}
