//! Typed connector configuration model.
//!
//! Connector configs are open-ended (declared by the connector, not the core
//! model), so values are a tagged variant rather than untyped maps. The codec
//! and the registry validators share this one representation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single typed config value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum ConfigValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    /// One option out of the enum declared by the input's schema.
    Enum(String),
    /// Ordered list of string maps (e.g. column mappings).
    List(Vec<BTreeMap<String, String>>),
}

impl ConfigValue {
    /// Short type tag used in validation messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
        }
    }
}

/// A named value inside an input group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub name: String,
    #[serde(flatten)]
    pub value: ConfigValue,
}

/// A named, order-preserving group of config entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigGroup {
    pub name: String,
    pub inputs: Vec<ConfigEntry>,
}

/// The full config payload of one link or one job direction: an ordered list
/// of named input groups. Owned by the enclosing record; never shared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigPayload {
    pub groups: Vec<ConfigGroup>,
}

impl ConfigPayload {
    /// Look up a value by group and input name.
    #[must_use]
    pub fn get(&self, group: &str, input: &str) -> Option<&ConfigValue> {
        self.groups
            .iter()
            .find(|g| g.name == group)?
            .inputs
            .iter()
            .find(|e| e.name == input)
            .map(|e| &e.value)
    }

    /// Visit every embedded string mutably (`Text`, `Enum`, and `List` map
    /// values). Placeholder resolution runs through this.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error produced by `f`.
    pub fn try_visit_strings_mut<E>(
        &mut self,
        mut f: impl FnMut(&mut String) -> Result<(), E>,
    ) -> Result<(), E> {
        for group in &mut self.groups {
            for entry in &mut group.inputs {
                match &mut entry.value {
                    ConfigValue::Text(s) | ConfigValue::Enum(s) => f(s)?,
                    ConfigValue::List(maps) => {
                        for map in maps {
                            for value in map.values_mut() {
                                f(value)?;
                            }
                        }
                    }
                    ConfigValue::Integer(_) | ConfigValue::Boolean(_) => {}
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

/// Expected type of a declared input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InputType {
    Text,
    Integer,
    Boolean,
    Enum { options: Vec<String> },
    List,
}

impl InputType {
    /// Whether `value` carries this input type.
    #[must_use]
    pub fn matches(&self, value: &ConfigValue) -> bool {
        matches!(
            (self, value),
            (Self::Text, ConfigValue::Text(_))
                | (Self::Integer, ConfigValue::Integer(_))
                | (Self::Boolean, ConfigValue::Boolean(_))
                | (Self::Enum { .. }, ConfigValue::Enum(_))
                | (Self::List, ConfigValue::List(_))
        )
    }
}

/// Declarative per-input check run by the registry after substitution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "kebab-case")]
pub enum InputValidator {
    /// The text value must name an existing directory in the target
    /// deployment.
    DirectoryExists,
    /// Integer value must fall within `[min, max]`.
    Range { min: i64, max: i64 },
}

/// One declared input of a connector config schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,
    #[serde(flatten)]
    pub input_type: InputType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<InputValidator>,
}

/// A named group of declared inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputGroup {
    pub name: String,
    pub inputs: Vec<InputSpec>,
}

/// Ordered set of named input groups declared by a connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSchema {
    pub groups: Vec<InputGroup>,
}

impl ConfigSchema {
    /// Look up a declared input by group and name.
    #[must_use]
    pub fn input(&self, group: &str, input: &str) -> Option<&InputSpec> {
        self.groups
            .iter()
            .find(|g| g.name == group)?
            .inputs
            .iter()
            .find(|i| i.name == input)
    }
}
