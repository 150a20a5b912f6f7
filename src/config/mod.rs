use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_DIR: &str = "datasets";
pub const DEFAULT_OUTPUT: &str = "surveillance_db.excam";
pub const DEFAULT_MANIFEST: &str = "manifest.json";
pub const DEFAULT_NAME: &str = "Scarecrow-db";
pub const DEFAULT_BASE_URL: &str = "https://localhost/scarecrow-db/";

/// Where to read datasets from and where to publish the results.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BuildConfig {
    pub input_dir: PathBuf,
    pub output: PathBuf,
    pub manifest: PathBuf,
    pub name: String,
    pub base_url: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            name: DEFAULT_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl BuildConfig {
    /// Built-in defaults, overlaid with the YAML file at `path` when given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = ::config::Config::builder()
            .set_default("input_dir", DEFAULT_INPUT_DIR)?
            .set_default("output", DEFAULT_OUTPUT)?
            .set_default("manifest", DEFAULT_MANIFEST)?
            .set_default("name", DEFAULT_NAME)?
            .set_default("base_url", DEFAULT_BASE_URL)?;

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }

        let settings = builder
            .build()
            .context("Config: Failed to read build configuration")?;
        Ok(settings.try_deserialize()?)
    }
}
