use std::path::Path;

use anyhow::{bail, Context, Result};

use metaport_engine::{codec, import, ImportOptions, InMemoryRegistry, Substitutions};
use metaport_repo::SqliteMetadataStore;
use metaport_types::entity::Connector;

/// Execute the `load` command: import an artifact into the repository.
pub fn execute(
    repository: &Path,
    input: &Path,
    substitutions: &[String],
    atomic: bool,
    connectors: Option<&Path>,
) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read artifact: {}", input.display()))?;
    let document = codec::decode(&raw)?;

    let substitutions = Substitutions::parse(substitutions)?;
    let registry = load_registry(connectors)?;
    let store = SqliteMetadataStore::open(repository)
        .with_context(|| format!("Failed to open repository: {}", repository.display()))?;

    let report = import(
        &store,
        &registry,
        &document,
        &substitutions,
        &ImportOptions {
            atomic,
            ..ImportOptions::default()
        },
    )?;

    if report.aborted {
        for rejection in &report.rejections {
            eprintln!("  rejected {} '{}': {}", rejection.kind, rejection.name, rejection.reason);
        }
        bail!("atomic load aborted, nothing was imported");
    }

    println!("Loaded artifact from {}", input.display());
    println!("  Links:       {}", report.links_imported.len());
    println!("  Jobs:        {}", report.jobs_imported.len());
    println!("  Submissions: {}", report.submissions_imported.len());
    if !report.is_clean() {
        println!("  Rejected:    {}", report.rejections.len());
        for rejection in &report.rejections {
            println!(
                "    {} '{}': {}",
                rejection.kind, rejection.name, rejection.reason
            );
        }
    }

    Ok(())
}

/// Read connector definitions from a JSON array file. With no file the
/// registry is empty and every imported link will be rejected as referencing
/// an unknown connector.
fn load_registry(path: Option<&Path>) -> Result<InMemoryRegistry> {
    let mut registry = InMemoryRegistry::new();
    if let Some(path) = path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read connectors file: {}", path.display()))?;
        let connectors: Vec<Connector> = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed connectors file: {}", path.display()))?;
        for connector in connectors {
            tracing::debug!(connector = %connector.name, "Registered connector");
            registry.register(connector);
        }
    }
    Ok(registry)
}
