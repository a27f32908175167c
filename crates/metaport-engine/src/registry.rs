//! Connector registry boundary and config validation.
//!
//! The registry supplies connector schemas and runs the live validators
//! (type checks, range checks, directory-existence checks) against
//! substituted config values. Import never creates connectors; it only
//! resolves them here by name.

use std::collections::BTreeMap;
use std::path::Path;

use metaport_types::config::{ConfigPayload, ConfigSchema, ConfigValue, InputType, InputValidator};
use metaport_types::entity::{Connector, ConnectorName};
use metaport_types::violation::{Violation, ViolationKind};

/// Which declared schema of a connector a payload is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAspect {
    /// Link config schema.
    Link,
    /// Per-direction job config schema.
    Job,
}

/// Live connector registry of the target deployment.
pub trait ConnectorRegistry: Send + Sync {
    /// Look up a connector by name.
    fn connector(&self, name: &ConnectorName) -> Option<&Connector>;

    /// Validate a substituted payload against the named connector's schema.
    ///
    /// Returns an empty list on success. An unknown connector yields a
    /// single [`ViolationKind::UnknownConnector`] violation.
    fn validate(
        &self,
        name: &ConnectorName,
        aspect: ConfigAspect,
        payload: &ConfigPayload,
    ) -> Vec<Violation>;

    /// Schema for job driver config, if the deployment declares one.
    fn driver_config(&self) -> Option<&ConfigSchema> {
        None
    }
}

/// Registry backed by an in-process connector table.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    connectors: BTreeMap<String, Connector>,
    driver: Option<ConfigSchema>,
}

impl InMemoryRegistry {
    /// Empty registry; every connector reference will fail to resolve.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector, replacing any previous one of the same name.
    pub fn register(&mut self, connector: Connector) {
        self.connectors
            .insert(connector.name.as_str().to_string(), connector);
    }

    /// Declare the deployment's driver config schema.
    #[must_use]
    pub fn with_driver_config(mut self, schema: ConfigSchema) -> Self {
        self.driver = Some(schema);
        self
    }
}

impl ConnectorRegistry for InMemoryRegistry {
    fn connector(&self, name: &ConnectorName) -> Option<&Connector> {
        self.connectors.get(name.as_str())
    }

    fn validate(
        &self,
        name: &ConnectorName,
        aspect: ConfigAspect,
        payload: &ConfigPayload,
    ) -> Vec<Violation> {
        let Some(connector) = self.connector(name) else {
            return vec![Violation {
                kind: ViolationKind::UnknownConnector,
                input: name.to_string(),
                message: format!("connector '{name}' is not registered"),
            }];
        };
        let schema = match aspect {
            ConfigAspect::Link => &connector.link_config,
            ConfigAspect::Job => &connector.job_config,
        };
        let violations = validate_payload(schema, payload);
        if violations.is_empty() {
            tracing::debug!(connector = %name, "Config validation passed");
        }
        violations
    }

    fn driver_config(&self) -> Option<&ConfigSchema> {
        self.driver.as_ref()
    }
}

/// Validate a payload against a declared schema.
///
/// Checks, in order per entry: the input is declared, its type matches, its
/// enum value is a declared option, and its declarative validator passes.
/// Afterwards, every required input must be present.
#[must_use]
pub fn validate_payload(schema: &ConfigSchema, payload: &ConfigPayload) -> Vec<Violation> {
    let mut violations = Vec::new();

    for group in &payload.groups {
        for entry in &group.inputs {
            let Some(spec) = schema.input(&group.name, &entry.name) else {
                violations.push(Violation::new(
                    ViolationKind::UnknownInput,
                    &group.name,
                    &entry.name,
                    "input is not declared by the connector",
                ));
                continue;
            };

            if !spec.input_type.matches(&entry.value) {
                violations.push(Violation::new(
                    ViolationKind::TypeMismatch,
                    &group.name,
                    &entry.name,
                    format!("expected {:?} value, got {}", spec.input_type, entry.value.type_name()),
                ));
                continue;
            }

            if let (InputType::Enum { options }, ConfigValue::Enum(value)) =
                (&spec.input_type, &entry.value)
            {
                if !options.contains(value) {
                    violations.push(Violation::new(
                        ViolationKind::InvalidOption,
                        &group.name,
                        &entry.name,
                        format!("'{value}' is not one of {options:?}"),
                    ));
                    continue;
                }
            }

            if let Some(validator) = &spec.validator {
                if let Some(v) = run_validator(validator, &group.name, &entry.name, &entry.value) {
                    violations.push(v);
                }
            }
        }
    }

    for group in &schema.groups {
        for spec in &group.inputs {
            if spec.required && payload.get(&group.name, &spec.name).is_none() {
                violations.push(Violation::new(
                    ViolationKind::MissingInput,
                    &group.name,
                    &spec.name,
                    "required input is missing",
                ));
            }
        }
    }

    violations
}

fn run_validator(
    validator: &InputValidator,
    group: &str,
    input: &str,
    value: &ConfigValue,
) -> Option<Violation> {
    match (validator, value) {
        (InputValidator::DirectoryExists, ConfigValue::Text(path)) => {
            if Path::new(path).is_dir() {
                None
            } else {
                Some(Violation::new(
                    ViolationKind::DirectoryNotFound,
                    group,
                    input,
                    format!("directory '{path}' does not exist"),
                ))
            }
        }
        (InputValidator::Range { min, max }, ConfigValue::Integer(n)) => {
            if n >= min && n <= max {
                None
            } else {
                Some(Violation::new(
                    ViolationKind::OutOfRange,
                    group,
                    input,
                    format!("{n} is outside [{min}, {max}]"),
                ))
            }
        }
        // Type mismatch was already reported; don't double-report.
        _ => None,
    }
}
