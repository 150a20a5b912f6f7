use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::Rule;
use crate::record::RawPoint;

/// Cell contents read as null, matching common spreadsheet/dataframe exports.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#NA", "#N/A N/A", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

pub const TABULAR_RULES: &[Rule<Table>] = &[
    Rule {
        name: "trilateration",
        extract: trilateration,
    },
    Rule {
        name: "standard",
        extract: standard,
    },
    Rule {
        name: "combined-coordinates",
        extract: combined_coordinates,
    },
];

/// A parsed CSV file with lowercase, trimmed column names.
#[derive(Debug)]
pub struct Table {
    columns: HashMap<String, usize>,
    rows: Vec<StringRecord>,
}

impl Table {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .context("Failed to read header row")?
            .clone();
        if headers.is_empty() {
            bail!("No columns to parse");
        }

        let mut columns = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            // Duplicate headers resolve to the leftmost column
            columns.entry(name.trim().to_lowercase()).or_insert(idx);
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context("Malformed row")?;
            if record.len() > headers.len() {
                let line = record.position().map(|pos| pos.line()).unwrap_or(0);
                bail!(
                    "Expected {} fields on line {}, saw {}",
                    headers.len(),
                    line,
                    record.len()
                );
            }
            rows.push(record);
        }

        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// Cells of one column; short rows and missing markers read as `None`.
    pub fn cells(&self, idx: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(idx).filter(|cell| !is_missing(cell)))
    }
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

fn parse_coord(cell: Option<&str>, column: &str) -> Result<Option<f64>> {
    let Some(text) = cell.filter(|text| !is_missing(text)) else {
        return Ok(None);
    };
    let value = text
        .parse::<f64>()
        .with_context(|| format!("Could not convert {:?} in column '{}' to float", text, column))?;
    Ok(Some(value))
}

/// Split halves of a non-null cell carry no null markers of their own.
fn parse_part(part: &str) -> Result<f64> {
    part.parse::<f64>()
        .with_context(|| format!("Could not convert {:?} in column 'coordinates' to float", part))
}

fn paired_columns(table: &Table, lat: &str, lon: &str) -> Option<Result<Vec<RawPoint>>> {
    let lat_idx = table.column(lat)?;
    let lon_idx = table.column(lon)?;

    let points = table
        .cells(lat_idx)
        .zip(table.cells(lon_idx))
        .map(|(lat_cell, lon_cell)| -> Result<RawPoint> {
            Ok(RawPoint::new(
                parse_coord(lat_cell, lat)?,
                parse_coord(lon_cell, lon)?,
            ))
        })
        .collect();
    Some(points)
}

/// Wardriving exports with trilaterated positions.
fn trilateration(table: &Table) -> Option<Result<Vec<RawPoint>>> {
    paired_columns(table, "trilat", "trilong")
}

fn standard(table: &Table) -> Option<Result<Vec<RawPoint>>> {
    paired_columns(table, "latitude", "longitude")
}

/// A single `coordinates` column holding `"lat, lon"` text.
fn combined_coordinates(table: &Table) -> Option<Result<Vec<RawPoint>>> {
    let idx = table.column("coordinates")?;

    let split: Vec<Vec<&str>> = table
        .cells(idx)
        .map(|cell| match cell {
            Some(text) => text.split(',').map(str::trim).collect(),
            None => Vec::new(),
        })
        .collect();

    if split.iter().all(|parts| parts.len() < 2) {
        return Some(Ok(Vec::new()));
    }

    // Parts beyond the second are ignored
    let points = split
        .iter()
        .map(|parts| -> Result<RawPoint> {
            let lat = parts.first().copied().map(parse_part).transpose()?;
            let lon = parts.get(1).copied().map(parse_part).transpose()?;
            Ok(RawPoint::new(lat, lon))
        })
        .collect();
    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Extraction, classify};
    use crate::flag::Flag;
    use crate::record::Record;

    fn table(text: &str) -> Table {
        Table::from_reader(text.as_bytes()).unwrap()
    }

    fn records(text: &str, flag: Flag) -> Vec<Record> {
        match classify(TABULAR_RULES, &table(text), flag) {
            Extraction::Matched { records, .. } => records,
            other => panic!("unexpected extraction: {other:?}"),
        }
    }

    #[test]
    fn normalizes_header_names() {
        let table = table(" Latitude ,LONGITUDE\n1,2\n");
        assert_eq!(table.column("latitude"), Some(0));
        assert_eq!(table.column("longitude"), Some(1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn reads_standard_columns() {
        let records = records("Latitude,Longitude\n40.7128,-74.0060\n", Flag::Alpr);
        assert_eq!(records, vec![Record::new(40.7128, -74.006, Flag::Alpr)]);
    }

    #[test]
    fn reads_trilateration_columns() {
        let text = "mac,trilat,trilong,ssid\naa:bb,45.5,-122.6,cam\n";
        assert_eq!(
            records(text, Flag::Audio),
            vec![Record::new(45.5, -122.6, Flag::Audio)]
        );
    }

    #[test]
    fn trilateration_takes_priority_over_standard() {
        let text = "latitude,longitude,trilat,trilong\n1,2,3,4\n";
        match classify(TABULAR_RULES, &table(text), Flag::Alpr) {
            Extraction::Matched { rule, records, .. } => {
                assert_eq!(rule, "trilateration");
                assert_eq!(records, vec![Record::new(3.0, 4.0, Flag::Alpr)]);
            }
            other => panic!("unexpected extraction: {other:?}"),
        }
    }

    #[test]
    fn empty_priority_columns_do_not_fall_through() {
        let text = "trilat,trilong,latitude,longitude\n,,1,2\n";
        match classify(TABULAR_RULES, &table(text), Flag::Alpr) {
            Extraction::Matched {
                rule,
                records,
                dropped,
            } => {
                assert_eq!(rule, "trilateration");
                assert!(records.is_empty());
                assert_eq!(dropped, 1);
            }
            other => panic!("unexpected extraction: {other:?}"),
        }
    }

    #[test]
    fn splits_combined_coordinates() {
        let text = "name,coordinates\ncam,\"51.5074, -0.1278\"\n";
        assert_eq!(
            records(text, Flag::Alpr),
            vec![Record::new(51.5074, -0.1278, Flag::Alpr)]
        );
    }

    #[test]
    fn combined_coordinates_ignore_extra_parts() {
        let text = "coordinates\n\"1,2,3\"\n";
        assert_eq!(records(text, Flag::Alpr), vec![Record::new(1.0, 2.0, Flag::Alpr)]);
    }

    #[test]
    fn combined_coordinates_without_separator_yield_nothing() {
        let text = "coordinates\n51.5\n52.1\n";
        assert!(records(text, Flag::Alpr).is_empty());
    }

    #[test]
    fn combined_coordinates_drop_single_part_rows() {
        let text = "coordinates\n\"1.5, 2.5\"\n3.5\n";
        assert_eq!(records(text, Flag::Alpr), vec![Record::new(1.5, 2.5, Flag::Alpr)]);
    }

    #[test]
    fn empty_or_marker_half_rejects_whole_file() {
        for text in [
            "coordinates\n\"1.5, 2.5\"\n\"3.5,\"\n",
            "coordinates\n\"1.5, 2.5\"\n\"N/A, 4\"\n",
        ] {
            assert!(
                matches!(
                    classify(TABULAR_RULES, &table(text), Flag::Alpr),
                    Extraction::Rejected {
                        rule: "combined-coordinates",
                        ..
                    }
                ),
                "expected rejection for {text:?}"
            );
        }
    }

    #[test]
    fn non_finite_values_are_dropped() {
        let text = "latitude,longitude\ninf,2\n-infinity,3\n1.5,2.5\n";
        match classify(TABULAR_RULES, &table(text), Flag::Alpr) {
            Extraction::Matched {
                records, dropped, ..
            } => {
                assert_eq!(records, vec![Record::new(1.5, 2.5, Flag::Alpr)]);
                assert_eq!(dropped, 2);
            }
            other => panic!("unexpected extraction: {other:?}"),
        }
    }

    #[test]
    fn unparsable_value_rejects_whole_file() {
        let text = "coordinates\n\"1.5, 2.5\"\n\"north, 2.5\"\n";
        match classify(TABULAR_RULES, &table(text), Flag::Alpr) {
            Extraction::Rejected { rule, reason } => {
                assert_eq!(rule, "combined-coordinates");
                assert!(reason.contains("north"), "unexpected reason: {reason}");
            }
            other => panic!("unexpected extraction: {other:?}"),
        }
    }

    #[test]
    fn missing_cells_are_dropped() {
        let text = "latitude,longitude\n1,2\nNaN,3\n4,\n5\n6,7\n";
        match classify(TABULAR_RULES, &table(text), Flag::Alpr) {
            Extraction::Matched {
                records, dropped, ..
            } => {
                assert_eq!(
                    records,
                    vec![
                        Record::new(1.0, 2.0, Flag::Alpr),
                        Record::new(6.0, 7.0, Flag::Alpr)
                    ]
                );
                assert_eq!(dropped, 3);
            }
            other => panic!("unexpected extraction: {other:?}"),
        }
    }

    #[test]
    fn telemetry_without_location_is_unrecognized() {
        let text = "Application,ProcessID,FrameTime\ngame.exe,1234,16.6\n";
        assert_eq!(
            classify(TABULAR_RULES, &table(text), Flag::Alpr),
            Extraction::Unrecognized
        );
    }

    #[test]
    fn rejects_empty_input() {
        assert!(Table::from_reader("".as_bytes()).is_err());
    }

    #[test]
    fn rejects_rows_wider_than_header() {
        let err = Table::from_reader("latitude,longitude\n1,2,3\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Expected 2 fields"));
    }
}
