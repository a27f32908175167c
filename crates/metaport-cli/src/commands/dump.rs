use std::path::Path;

use anyhow::{Context, Result};

use metaport_engine::codec;
use metaport_repo::SqliteMetadataStore;

/// Execute the `dump` command: snapshot the repository into an artifact.
pub fn execute(repository: &Path, output: Option<&Path>, job: Option<&str>) -> Result<()> {
    let store = SqliteMetadataStore::open(repository)
        .with_context(|| format!("Failed to open repository: {}", repository.display()))?;

    let document = match job {
        Some(job) => metaport_engine::export_filtered(&store, &|s| s.job_name.as_str() == job)?,
        None => metaport_engine::export(&store)?,
    };
    let text = codec::encode(&document)?;

    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write artifact: {}", path.display()))?;
            println!("Dumped repository to {}", path.display());
            println!("  Links:       {}", document.links.link.len());
            println!("  Jobs:        {}", document.jobs.job.len());
            println!("  Submissions: {}", document.submissions.submission.len());
        }
        // Keep stdout clean so the artifact can be piped
        None => println!("{text}"),
    }

    Ok(())
}
