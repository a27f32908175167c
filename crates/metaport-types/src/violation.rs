//! Config validation violations reported by the connector registry.

use serde::{Deserialize, Serialize};

/// Classification of a config validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Input present in the payload but not declared by the schema.
    UnknownInput,
    /// Required input missing from the payload.
    MissingInput,
    /// Value variant does not match the declared input type.
    TypeMismatch,
    /// Enum value outside the declared option set.
    InvalidOption,
    /// Integer outside the declared range.
    OutOfRange,
    /// Referenced directory does not exist in the target deployment.
    DirectoryNotFound,
    /// Payload validated against a connector the registry does not know.
    UnknownConnector,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::UnknownInput => "unknown_input",
            Self::MissingInput => "missing_input",
            Self::TypeMismatch => "type_mismatch",
            Self::InvalidOption => "invalid_option",
            Self::OutOfRange => "out_of_range",
            Self::DirectoryNotFound => "directory_not_found",
            Self::UnknownConnector => "unknown_connector",
        };
        f.write_str(s)
    }
}

/// One config validation failure, addressed by `group.input`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// `group.input` path of the offending value.
    pub input: String,
    pub message: String,
}

impl Violation {
    /// Build a violation for `group.input`.
    #[must_use]
    pub fn new(kind: ViolationKind, group: &str, input: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            input: format!("{group}.{input}"),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.input, self.message)
    }
}
