//! GeoJSON builders and temporary files for file-based tests.

use std::io::Write;

use grid_common::FieldValue;
use serde_json::{json, Map, Value};
use tempfile::NamedTempFile;

use crate::fixtures::FixtureFeature;

/// Serialize fixture features as a GeoJSON FeatureCollection.
pub fn feature_collection_json(features: &[FixtureFeature]) -> String {
    let features: Vec<Value> = features
        .iter()
        .map(|(polygon, attributes)| {
            let mut rings = vec![ring_json(polygon.exterior())];
            rings.extend(polygon.interiors().iter().map(ring_json));

            let properties: Map<String, Value> = attributes
                .iter()
                .map(|(name, value)| (name.clone(), field_json(value)))
                .collect();

            json!({
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": rings },
                "properties": properties,
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features }).to_string()
}

fn ring_json(ring: &geo_types::LineString<f64>) -> Value {
    Value::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}

fn field_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Integer(v) => json!(v),
        FieldValue::Real(v) => json!(v),
        FieldValue::String(v) => json!(v),
        FieldValue::Boolean(v) => json!(v),
    }
}

/// Write `contents` to a temporary file with the given suffix.
///
/// The file is removed when the returned handle is dropped.
pub fn temp_file_with(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// Write fixture features to a temporary `.geojson` file.
pub fn temp_geojson_file(features: &[FixtureFeature]) -> NamedTempFile {
    temp_file_with(&feature_collection_json(features), ".geojson")
}
