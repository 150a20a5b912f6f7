mod app;
mod classify;
mod config;
mod flag;
mod ingest;
mod merge;
mod metadata;
mod record;
mod sinks;
mod utils;

use anyhow::Result;
use clap::Parser;

use app::{Cli, RunOutcome, run};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.build_config()?;
    tracing::info!(
        "Build: {:?} -> {:?} (manifest {:?})",
        config.input_dir,
        config.output,
        config.manifest
    );

    let start = std::time::Instant::now();
    match run(&config)? {
        RunOutcome::NothingFound => {}
        RunOutcome::Published { records, .. } => {
            tracing::info!(
                "Done! Written {} records in {:.2}s",
                records,
                start.elapsed().as_secs_f64()
            );
        }
    }

    Ok(())
}
