use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::metadata::Stamp;
use crate::utils::{commit_file, stage_file};

/// Pointer document telling clients where the current database lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub date: String,
    pub revision: i64,
    #[serde(rename = "dataUrl")]
    pub data_url: String,
}

impl Manifest {
    pub fn new(stamp: &Stamp, base_url: &str, artifact: &Path) -> Self {
        let file_name = artifact
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let separator = if base_url.ends_with('/') { "" } else { "/" };

        Self {
            date: stamp.date.clone(),
            revision: stamp.revision,
            data_url: format!("{base_url}{separator}{file_name}"),
        }
    }
}

pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    let mut staged = stage_file(path).context("Manifest: Failed to stage output")?;
    serde_json::to_writer_pretty(&mut staged, manifest).context("Manifest: Failed to serialize")?;
    writeln!(staged)?;
    commit_file(staged, path).context("Manifest: Failed to commit output")
}
