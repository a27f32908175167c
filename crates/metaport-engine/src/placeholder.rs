//! Deployment placeholder substitution for config values.
//!
//! Dumped configs may embed deployment-specific values (filesystem paths,
//! URLs) as `${NAME}` tokens. At import time each token is replaced from a
//! caller-supplied table, typically built from the target deployment's own
//! working directories. An unresolvable token is a hard error, never a
//! silent pass-through: downstream validators (e.g. directory-existence
//! checks) would otherwise fail with a confusing secondary error.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use metaport_types::config::ConfigPayload;
use regex::Regex;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_.-]*)\}").expect("valid placeholder regex")
});

/// Placeholder resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceholderError {
    /// One or more tokens had no entry in the substitution table.
    #[error("unresolved placeholder(s): {}", .tokens.join(", "))]
    Unresolved { tokens: Vec<String> },

    /// A CLI-style table entry was not of the form `KEY=VALUE`.
    #[error("invalid substitution entry '{entry}', expected KEY=VALUE")]
    InvalidEntry { entry: String },
}

/// Caller-supplied token substitution table.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    entries: BTreeMap<String, String>,
}

impl Substitutions {
    /// Empty table. Any token encountered will be an error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one token mapping, builder style.
    #[must_use]
    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(token.into(), value.into());
        self
    }

    /// Parse `KEY=VALUE` entries, as passed on a command line.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceholderError::InvalidEntry`] for an entry without `=`
    /// or with an empty key.
    pub fn parse(entries: &[String]) -> Result<Self, PlaceholderError> {
        let mut table = Self::new();
        for entry in entries {
            let Some((key, value)) = entry.split_once('=') else {
                return Err(PlaceholderError::InvalidEntry {
                    entry: entry.clone(),
                });
            };
            if key.is_empty() {
                return Err(PlaceholderError::InvalidEntry {
                    entry: entry.clone(),
                });
            }
            table.entries.insert(key.to_string(), value.to_string());
        }
        Ok(table)
    }

    /// Substitute every `${NAME}` token in `input`.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceholderError::Unresolved`] listing every token without
    /// a table entry.
    pub fn apply(&self, input: &str) -> Result<String, PlaceholderError> {
        let mut result = input.to_string();
        let mut missing = Vec::new();

        for cap in TOKEN_RE.captures_iter(input) {
            let token = &cap[1];
            match self.entries.get(token) {
                Some(value) => {
                    result = result.replace(&cap[0], value);
                }
                None => {
                    missing.push(token.to_string());
                }
            }
        }

        if !missing.is_empty() {
            return Err(PlaceholderError::Unresolved { tokens: missing });
        }
        Ok(result)
    }

    /// Substitute tokens in every string value of a config payload.
    ///
    /// Runs once per entity, before validation.
    ///
    /// # Errors
    ///
    /// Returns the first [`PlaceholderError::Unresolved`] encountered.
    pub fn resolve_payload(&self, payload: &mut ConfigPayload) -> Result<(), PlaceholderError> {
        payload.try_visit_strings_mut(|s| {
            *s = self.apply(s)?;
            Ok(())
        })
    }
}
