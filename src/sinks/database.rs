use anyhow::{Context, Result};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use xz2::write::XzEncoder;

use crate::metadata::DatabaseHeader;
use crate::record::Record;
use crate::utils::{commit_file, stage_file};

const XZ_PRESET: u32 = 6;

/// Streams the database as xz-compressed JSON lines into a staging file.
/// Nothing appears at the target path until `finish` succeeds.
pub struct DatabaseSink {
    writer: BufWriter<XzEncoder<NamedTempFile>>,
    target: PathBuf,
    count: u64,
}

impl DatabaseSink {
    pub fn new<P: AsRef<Path>>(path: P, header: &DatabaseHeader<'_>) -> Result<Self> {
        let target = path.as_ref().to_path_buf();
        let staged = stage_file(&target).context("Database: Failed to stage output")?;
        let mut writer = BufWriter::new(XzEncoder::new(staged, XZ_PRESET));

        serde_json::to_writer(&mut writer, header).context("Database: Failed to write header")?;
        writeln!(writer)?;

        Ok(Self {
            writer,
            target,
            count: 0,
        })
    }

    pub fn add_record(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        writeln!(self.writer)?;
        self.count += 1;
        Ok(())
    }

    pub fn finish(self) -> Result<u64> {
        let encoder = self
            .writer
            .into_inner()
            .map_err(|err| err.into_error())
            .context("Database: Failed to flush records")?;
        let staged = encoder
            .finish()
            .context("Database: Failed to finish compression stream")?;
        commit_file(staged, &self.target).context("Database: Failed to commit output")?;
        Ok(self.count)
    }
}

pub fn write_database(path: &Path, header: &DatabaseHeader<'_>, records: &[Record]) -> Result<u64> {
    let mut sink = DatabaseSink::new(path, header)?;
    for record in records {
        sink.add_record(record)
            .with_context(|| format!("Database: Failed writing record {:?}", record))?;
    }
    sink.finish()
}
