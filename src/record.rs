use serde::Serialize;

use crate::flag::Flag;

// Coordinates are kept at 6 decimal digits (~0.1 m)
const SCALE_FACTOR: f64 = 1_000_000.0;

/// One normalized camera or sensor location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Record {
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "flg")]
    pub flag: Flag,
    #[serde(rename = "dir")]
    pub direction: Option<f64>,
}

impl Record {
    pub fn new(lat: f64, lon: f64, flag: Flag) -> Self {
        Self {
            lat,
            lon,
            flag,
            direction: None,
        }
    }

    pub fn rounded(self) -> Self {
        Self {
            lat: round_coord(self.lat),
            lon: round_coord(self.lon),
            ..self
        }
    }

    /// Identity used for deduplication; expects rounded coordinates.
    pub fn key(&self) -> (u64, u64, u32) {
        (coord_bits(self.lat), coord_bits(self.lon), self.flag.bits())
    }
}

/// Round half-to-even at the sixth decimal.
pub fn round_coord(value: f64) -> f64 {
    let scaled = value * SCALE_FACTOR;
    if !scaled.is_finite() {
        // Already coarser than a microdegree
        return value;
    }
    scaled.round_ties_even() / SCALE_FACTOR
}

fn coord_bits(value: f64) -> u64 {
    // -0.0 and 0.0 are the same point
    if value == 0.0 { 0 } else { value.to_bits() }
}

/// A coordinate pair as read from a source, before null filtering.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawPoint {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl RawPoint {
    pub fn new(lat: Option<f64>, lon: Option<f64>) -> Self {
        Self {
            lat: lat.filter(|v| v.is_finite()),
            lon: lon.filter(|v| v.is_finite()),
        }
    }

    pub fn into_record(self, flag: Flag) -> Option<Record> {
        Some(Record::new(self.lat?, self.lon?, flag))
    }
}
