//! Export/import engine for repository metadata.
//!
//! Serializes a live repository (links, jobs, submissions) into a portable
//! versioned artifact and reconstructs an equivalent repository state from
//! such an artifact in a different deployment. Identity is re-derived by
//! name at import time; local store ids never cross the artifact boundary.

#![warn(clippy::pedantic)]

pub mod codec;
pub mod error;
pub mod export;
pub mod import;
pub mod placeholder;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod version;

// Re-export public API for convenience
pub use error::{ExportError, ImportError};
pub use export::{export, export_filtered};
pub use import::{import, ImportOptions};
pub use placeholder::Substitutions;
pub use registry::{ConnectorRegistry, InMemoryRegistry};
pub use report::ImportReport;
pub use version::VersionPolicy;
