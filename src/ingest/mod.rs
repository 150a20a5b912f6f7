//! Dataset directory ingestion.
//!
//! Every file in the input directory is routed by extension to the CSV or
//! JSON classifier chain. Per-file failures are reported and skipped; they
//! never abort the run.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::classify::{Extraction, JSON_RULES, TABULAR_RULES, Table, classify, json};
use crate::flag::Flag;
use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Tabular,
    Json,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "csv" => Some(InputKind::Tabular),
            "json" | "geojson" => Some(InputKind::Json),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum FileOutcome {
    Imported(Vec<Record>),
    /// Parsed fine but holds no usable coordinates.
    Empty,
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    pub name: String,
    pub count: usize,
}

/// Records accumulated across files, in ingestion order.
#[derive(Debug, Default)]
pub struct Dataset {
    records: Vec<Record>,
    sources: Vec<SourceSummary>,
}

impl Dataset {
    pub fn push(&mut self, name: String, records: Vec<Record>) {
        self.sources.push(SourceSummary {
            name,
            count: records.len(),
        });
        self.records.extend(records);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn sources(&self) -> &[SourceSummary] {
        &self.sources
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// List the entries of `dir`, sorted by path. Hidden entries are left out
/// and a missing directory is empty.
pub fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::warn!("Input directory {:?} does not exist", dir);
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Ingest: Failed to read input directory {:?}", dir));
        }
    };

    let mut paths = entries
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Ingest: Failed to list input directory {:?}", dir))?;
    paths.retain(|path| !is_hidden(path));
    paths.sort();
    Ok(paths)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

pub fn ingest_file(path: &Path, kind: InputKind) -> FileOutcome {
    let extraction = match kind {
        InputKind::Tabular => match Table::from_path(path) {
            Ok(table) => {
                tracing::debug!("{:?}: {} rows", path, table.len());
                classify(TABULAR_RULES, &table, Flag::from_filename(path))
            }
            Err(err) => return FileOutcome::Skipped(format!("not a valid CSV: {err:#}")),
        },
        // Map-derived coordinates are always plate readers
        InputKind::Json => match json::read_document(path) {
            Ok(doc) => classify(JSON_RULES, &doc, Flag::Alpr),
            Err(err) => return FileOutcome::Skipped(format!("error parsing JSON: {err:#}")),
        },
    };

    match extraction {
        Extraction::Matched {
            rule,
            records,
            dropped,
        } => {
            tracing::debug!(
                "{:?}: {} layout, {} rows kept, {} without coordinates",
                path,
                rule,
                records.len(),
                dropped
            );
            if records.is_empty() {
                FileOutcome::Empty
            } else {
                FileOutcome::Imported(records)
            }
        }
        Extraction::Rejected { rule, reason } => {
            FileOutcome::Skipped(format!("{} layout: {}", rule, reason))
        }
        Extraction::Unrecognized => {
            tracing::debug!("{:?}: no location data", path);
            FileOutcome::Empty
        }
    }
}

/// Ingest every recognized file directly inside `dir`.
pub fn ingest_dir(dir: &Path) -> Result<Dataset> {
    let paths = scan_dir(dir)?;
    tracing::info!("Scanning {:?}... Found {} files.", dir, paths.len());

    let mut dataset = Dataset::default();
    for path in paths {
        if path.is_dir() {
            continue;
        }
        let Some(kind) = InputKind::from_path(&path) else {
            continue;
        };

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match ingest_file(&path, kind) {
            FileOutcome::Imported(records) => {
                tracing::info!("  -> Imported {:>5} cameras from {}", records.len(), name);
                dataset.push(name, records);
            }
            FileOutcome::Empty => {}
            FileOutcome::Skipped(reason) => tracing::warn!("Skipping {}: {}", name, reason),
        }
    }

    Ok(dataset)
}
