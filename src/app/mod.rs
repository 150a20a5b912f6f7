use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::BuildConfig;
use crate::ingest::ingest_dir;
use crate::merge::merge;
use crate::metadata::{DatabaseHeader, Stamp};
use crate::sinks::{Manifest, write_database, write_manifest};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Build configuration file (YAML)
    #[arg(short, long, env = "SCARECROW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the source datasets
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Database artifact to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Manifest file to write
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// URL the artifact is published under
    #[arg(long)]
    pub base_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn build_config(&self) -> Result<BuildConfig> {
        let mut config = BuildConfig::load(self.config.as_deref())?;
        if let Some(input) = &self.input {
            config.input_dir = input.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(manifest) = &self.manifest {
            config.manifest = manifest.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        Ok(config)
    }
}

#[derive(Debug, PartialEq)]
pub enum RunOutcome {
    /// No input file held camera data; nothing was written.
    NothingFound,
    Published { records: u64, stamp: Stamp },
}

pub fn run(config: &BuildConfig) -> Result<RunOutcome> {
    let dataset = ingest_dir(&config.input_dir)?;
    if dataset.is_empty() {
        tracing::info!(
            "No valid camera data found in {:?} folder.",
            config.input_dir
        );
        return Ok(RunOutcome::NothingFound);
    }
    if let Some(largest) = dataset.sources().iter().max_by_key(|source| source.count) {
        tracing::debug!(
            "{} source files contributed records, largest {} ({})",
            dataset.sources().len(),
            largest.name,
            largest.count
        );
    }

    let records = merge(dataset);
    tracing::info!("Total Unique Surveillance Nodes: {}", records.len());

    let stamp = Stamp::now()?;
    let header = DatabaseHeader::new(&config.name, &stamp);
    let written = write_database(&config.output, &header, &records)
        .with_context(|| format!("Failed to write database {:?}", config.output))?;

    // Only reached once the artifact is committed
    let manifest = Manifest::new(&stamp, &config.base_url, &config.output);
    write_manifest(&config.manifest, &manifest)
        .with_context(|| format!("Failed to write manifest {:?}", config.manifest))?;

    tracing::info!(
        "Success! Database generated: {:?} (revision {})",
        config.output,
        stamp.revision
    );
    Ok(RunOutcome::Published {
        records: written,
        stamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config_in(root: &std::path::Path) -> BuildConfig {
        BuildConfig {
            input_dir: root.join("datasets"),
            output: root.join("surveillance_db.excam"),
            manifest: root.join("manifest.json"),
            ..BuildConfig::default()
        }
    }

    #[test]
    fn cli_flags_override_config() {
        let cli = Cli::parse_from([
            "scarecrow-db",
            "--input",
            "feeds",
            "--base-url",
            "https://cdn.example.org/",
        ]);
        let config = cli.build_config().unwrap();
        assert_eq!(config.input_dir, PathBuf::from("feeds"));
        assert_eq!(config.base_url, "https://cdn.example.org/");
        assert_eq!(config.output, BuildConfig::default().output);
    }

    #[test]
    fn nothing_found_writes_nothing() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("presentmon.csv"), "a,b\n1,2\n").unwrap();

        assert_eq!(run(&config).unwrap(), RunOutcome::NothingFound);
        assert!(!config.output.exists());
        assert!(!config.manifest.exists());
    }

    #[test]
    fn manifest_shares_the_database_stamp() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir(&config.input_dir).unwrap();
        fs::write(
            config.input_dir.join("foo.csv"),
            "Latitude,Longitude\n40.7128,-74.0060\n40.7128,-74.0060\n",
        )
        .unwrap();

        let RunOutcome::Published { records, stamp } = run(&config).unwrap() else {
            panic!("expected a published database");
        };
        assert_eq!(records, 1);

        let manifest: Manifest =
            serde_json::from_str(&fs::read_to_string(&config.manifest).unwrap()).unwrap();
        assert_eq!(manifest.revision, stamp.revision);
        assert_eq!(manifest.date, stamp.date);
    }

    #[test]
    fn failed_database_write_leaves_no_manifest() {
        let dir = tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.output = dir.path().join("missing").join("db.excam");
        fs::create_dir(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("foo.csv"), "latitude,longitude\n1,2\n").unwrap();

        assert!(run(&config).is_err());
        assert!(!config.manifest.exists());
    }
}
