mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Set up tracing output for a batch tool.
///
/// `RUST_LOG` wins over `--log-level`. Events go to stderr so a dump piped
/// to stdout stays a valid artifact.
fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Parser)]
#[command(
    name = "metaport",
    version,
    about = "Dump and load repository metadata as portable artifacts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the repository SQLite database
    #[arg(long, default_value = "metaport.db", global = true)]
    repository: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the repository into an artifact file
    Dump {
        /// Artifact output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only dump submissions of this job (links and jobs are always dumped in full)
        #[arg(long)]
        job: Option<String>,
    },
    /// Load an artifact file into the repository
    Load {
        /// Artifact input path
        #[arg(short, long)]
        input: PathBuf,
        /// Placeholder substitution, e.g. -s NAMENODE=hdfs://nn:8020 (repeatable)
        #[arg(short = 's', long = "set")]
        substitutions: Vec<String>,
        /// Reject the whole artifact if any entity would be rejected
        #[arg(long)]
        atomic: bool,
        /// Connector definitions JSON (defaults to an empty registry)
        #[arg(long)]
        connectors: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    match cli.command {
        Commands::Dump { output, job } => {
            commands::dump::execute(&cli.repository, output.as_deref(), job.as_deref())
        }
        Commands::Load {
            input,
            substitutions,
            atomic,
            connectors,
        } => commands::load::execute(
            &cli.repository,
            &input,
            &substitutions,
            atomic,
            connectors.as_deref(),
        ),
    }
}
