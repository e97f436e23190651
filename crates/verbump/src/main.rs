use std::io::{self, Read};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use verbump::config::AnalyzerConfig;
use verbump::{output, pipeline};
use verbump_diff::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHUNKS};
use verbump_wire::{StdioTransport, Transport, DEFAULT_MAX_ATTEMPTS, TOKEN_ENV};

#[derive(Parser, Debug)]
#[command(
    name = "verbump",
    version,
    about = "Classify a diff into a semantic version bump via a streaming inference backend"
)]
struct Cli {
    /// Backend command to spawn; speaks line-delimited JSON events on stdio
    #[arg(long, env = "VERBUMP_BACKEND")]
    backend: String,

    /// Maximum characters per analysis chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Upper bound on chunks per run (larger splits are merged)
    #[arg(long, default_value_t = DEFAULT_MAX_CHUNKS)]
    max_chunks: usize,

    /// Attempts per exchange before the run fails
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Extra ignore pattern (regex against diff file paths); repeatable
    #[arg(long = "ignore", value_name = "REGEX")]
    ignore: Vec<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The credential must be present before any work happens.
    let token = std::env::var(TOKEN_ENV)
        .with_context(|| format!("credential environment variable {TOKEN_ENV} is not set"))?;

    let mut diff = String::new();
    io::stdin()
        .read_to_string(&mut diff)
        .context("failed to read diff from stdin")?;

    let config = AnalyzerConfig {
        chunk_size: cli.chunk_size,
        max_chunks: cli.max_chunks,
        max_attempts: cli.max_attempts,
        extra_ignore: cli.ignore,
        ..AnalyzerConfig::default()
    };

    let backend = cli.backend.clone();
    let decision = pipeline::analyze(&config, &diff, move || async move {
        let transport = StdioTransport::spawn(&backend, &token).await?;
        Ok(Box::new(transport) as Box<dyn Transport>)
    })
    .await?;

    output::emit(&decision)?;
    Ok(())
}
