//! Artifact version compatibility policy.

use metaport_types::document::CURRENT_FORMAT_VERSION;

use crate::error::ImportError;

/// Set of artifact format versions an import will accept.
///
/// The default policy is strict equality with
/// [`CURRENT_FORMAT_VERSION`]; [`VersionPolicy::any_of`] widens it to a
/// compatibility range when older artifacts are known to import cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPolicy {
    supported: Vec<String>,
}

impl VersionPolicy {
    /// Accept exactly one version.
    #[must_use]
    pub fn exact(version: impl Into<String>) -> Self {
        Self {
            supported: vec![version.into()],
        }
    }

    /// Accept any of the given versions.
    #[must_use]
    pub fn any_of(versions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            supported: versions.into_iter().map(Into::into).collect(),
        }
    }

    /// Accept only the version this build writes.
    #[must_use]
    pub fn current() -> Self {
        Self::exact(CURRENT_FORMAT_VERSION)
    }

    /// Whether `version` is in the supported set.
    #[must_use]
    pub fn supports(&self, version: &str) -> bool {
        self.supported.iter().any(|v| v == version)
    }

    /// Gate an artifact version, before anything else is looked at.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::VersionIncompatible`] when `version` is
    /// outside the supported set.
    pub fn check(&self, version: &str) -> Result<(), ImportError> {
        if self.supports(version) {
            Ok(())
        } else {
            Err(ImportError::VersionIncompatible {
                found: version.to_string(),
                supported: self.supported.join(", "),
            })
        }
    }
}

impl Default for VersionPolicy {
    fn default() -> Self {
        Self::current()
    }
}
