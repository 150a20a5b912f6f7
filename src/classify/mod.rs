//! Schema recognition for map datasets.
//!
//! Each input shape has a classifier rule. Rules are tried in declared
//! priority order and the first one that recognizes the document decides
//! the outcome for the whole file.

pub mod json;
pub mod tabular;

pub use json::JSON_RULES;
pub use tabular::{TABULAR_RULES, Table};

use anyhow::Result;

use crate::flag::Flag;
use crate::record::{RawPoint, Record};

/// Extractor for one known shape.
///
/// Returns `None` when the document is not of this shape, otherwise the
/// coordinates read from it (nulls included) or the reason the whole
/// extraction was abandoned.
pub type ExtractFn<D> = fn(&D) -> Option<Result<Vec<RawPoint>>>;

pub struct Rule<D> {
    pub name: &'static str,
    pub extract: ExtractFn<D>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// A rule recognized the document. Rows with a missing coordinate are
    /// already removed and counted in `dropped`.
    Matched {
        rule: &'static str,
        records: Vec<Record>,
        dropped: usize,
    },
    /// A rule recognized the document but a field failed to parse.
    Rejected { rule: &'static str, reason: String },
    Unrecognized,
}

/// Run `rules` in order against `doc`; first match wins.
pub fn classify<D>(rules: &[Rule<D>], doc: &D, flag: Flag) -> Extraction {
    for rule in rules {
        match (rule.extract)(doc) {
            None => continue,
            Some(Ok(points)) => {
                let total = points.len();
                let records: Vec<Record> = points
                    .into_iter()
                    .filter_map(|point| point.into_record(flag))
                    .collect();
                return Extraction::Matched {
                    rule: rule.name,
                    dropped: total - records.len(),
                    records,
                };
            }
            Some(Err(err)) => {
                return Extraction::Rejected {
                    rule: rule.name,
                    reason: format!("{err:#}"),
                };
            }
        }
    }

    Extraction::Unrecognized
}
