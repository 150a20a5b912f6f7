use std::collections::HashSet;

use crate::ingest::Dataset;
use crate::record::Record;

/// Round every record to 6 decimals and keep the first of each distinct
/// `(lat, lon, flag)` triple.
pub fn deduplicate(records: impl IntoIterator<Item = Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .map(Record::rounded)
        .filter(|record| seen.insert(record.key()))
        .collect()
}

pub fn merge(dataset: Dataset) -> Vec<Record> {
    let total = dataset.len();
    let merged = deduplicate(dataset.into_records());
    tracing::debug!(
        "Merged {} records, {} duplicates removed",
        total,
        total - merged.len()
    );
    merged
}
