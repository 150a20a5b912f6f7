use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::Rule;
use crate::record::RawPoint;

pub const JSON_RULES: &[Rule<Value>] = &[
    Rule {
        name: "overpass",
        extract: overpass_elements,
    },
    Rule {
        name: "geojson",
        extract: feature_collection,
    },
];

pub fn read_document(path: &Path) -> Result<Value> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    serde_json::from_reader(BufReader::new(file)).context("Invalid JSON")
}

/// Overpass API output: `{"elements": [{"lat": .., "lon": ..}, ..]}`.
fn overpass_elements(doc: &Value) -> Option<Result<Vec<RawPoint>>> {
    let elements = doc.get("elements")?;
    let Some(elements) = elements.as_array() else {
        return Some(Err(anyhow!("`elements` is not a list")));
    };

    // Ways and relations carry no lat/lon and fall out as nulls
    let points = elements
        .iter()
        .filter_map(Value::as_object)
        .map(|element| {
            RawPoint::new(
                element.get("lat").and_then(Value::as_f64),
                element.get("lon").and_then(Value::as_f64),
            )
        })
        .collect();
    Some(Ok(points))
}

/// GeoJSON FeatureCollection; positions are `[lon, lat, ..]`.
fn feature_collection(doc: &Value) -> Option<Result<Vec<RawPoint>>> {
    if doc.get("type")?.as_str() != Some("FeatureCollection") {
        return None;
    }

    let Some(features) = doc.get("features").and_then(Value::as_array) else {
        return Some(Ok(Vec::new()));
    };

    let points = features
        .iter()
        .filter_map(|feature| {
            let coords = feature.get("geometry")?.get("coordinates")?.as_array()?;
            if coords.len() < 2 {
                return None;
            }
            Some(RawPoint::new(coords[1].as_f64(), coords[0].as_f64()))
        })
        .collect();
    Some(Ok(points))
}
