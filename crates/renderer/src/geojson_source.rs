//! Build a [`MemorySource`] from GeoJSON.
//!
//! Only Polygon and MultiPolygon geometries are accepted. The schema is
//! inferred from property values: integral numbers are Integer, other numbers
//! Real, strings String, booleans and nested JSON are carried as other types
//! and rendered as text. A field whose values disagree across features is
//! widened (Integer + Real becomes Real, any other mix becomes String).
//! Null properties count as absent.

use std::collections::HashMap;
use std::path::Path;

use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, GeoJson, Value};
use grid_common::{FieldDef, FieldType, FieldValue, GridError, GridResult};
use serde_json::Value as JsonValue;

use crate::source::{FeatureSource, MemorySource, VectorFeature};

/// Parse GeoJSON text (a FeatureCollection or a single Feature).
pub fn load_geojson(text: &str) -> GridResult<MemorySource> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e| GridError::SourceError(format!("Failed to parse GeoJSON: {}", e)))?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(GridError::SourceError(
                "GeoJSON geometry has no attributes; expected Feature or FeatureCollection"
                    .to_string(),
            ))
        }
    };

    let mut schema = SchemaBuilder::default();
    let mut source_features = Vec::with_capacity(features.len());

    for (index, feature) in features.iter().enumerate() {
        let Some(geometry) = convert_feature_geometry(index, feature)? else {
            tracing::warn!(feature = index, "Skipping feature without geometry");
            continue;
        };

        let mut attributes = Vec::new();
        if let Some(properties) = &feature.properties {
            for (name, value) in properties {
                if let Some((value, field_type)) = convert_property(value) {
                    schema.observe(name, field_type);
                    attributes.push((name.clone(), value));
                }
            }
        }
        source_features.push(VectorFeature::new(geometry, attributes));
    }

    let mut source = MemorySource::new(schema.finish());
    for feature in source_features {
        source.push(feature);
    }

    tracing::debug!(
        features = source.len(),
        fields = source.schema().len(),
        "Loaded GeoJSON source"
    );
    Ok(source)
}

/// Read and parse a GeoJSON file.
pub fn load_geojson_file(path: impl AsRef<Path>) -> GridResult<MemorySource> {
    let text = std::fs::read_to_string(path.as_ref())?;
    load_geojson(&text)
}

fn convert_feature_geometry(index: usize, feature: &Feature) -> GridResult<Option<MultiPolygon<f64>>> {
    let Some(geometry) = &feature.geometry else {
        return Ok(None);
    };

    let unsupported = |what: &str| {
        GridError::UnsupportedGeometry(format!("feature {}: {}", index, what))
    };

    match &geometry.value {
        Value::Polygon(rings) => {
            let polygon = convert_rings(rings).ok_or_else(|| unsupported("malformed polygon"))?;
            Ok(Some(MultiPolygon::new(vec![polygon])))
        }
        Value::MultiPolygon(polygons) => {
            let polygons = polygons
                .iter()
                .map(|rings| convert_rings(rings))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| unsupported("malformed multipolygon"))?;
            Ok(Some(MultiPolygon::new(polygons)))
        }
        other => Err(unsupported(geometry_type_name(other))),
    }
}

fn geometry_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn convert_rings(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let (exterior, holes) = rings.split_first()?;
    let holes = holes
        .iter()
        .map(|ring| convert_ring(ring))
        .collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(convert_ring(exterior)?, holes))
}

fn convert_ring(ring: &[Vec<f64>]) -> Option<LineString<f64>> {
    ring.iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(LineString::new)
}

fn convert_property(value: &JsonValue) -> Option<(FieldValue, FieldType)> {
    match value {
        JsonValue::Null => None,
        JsonValue::Bool(b) => Some((FieldValue::Boolean(*b), FieldType::Other("Boolean".to_string()))),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Some((FieldValue::Integer(i), FieldType::Integer)),
            None => n.as_f64().map(|f| (FieldValue::Real(f), FieldType::Real)),
        },
        JsonValue::String(s) => Some((FieldValue::String(s.clone()), FieldType::String)),
        JsonValue::Array(_) | JsonValue::Object(_) => Some((
            FieldValue::String(value.to_string()),
            FieldType::Other("JSON".to_string()),
        )),
    }
}

/// Collects field types in first-seen order.
#[derive(Default)]
struct SchemaBuilder {
    fields: Vec<FieldDef>,
    index: HashMap<String, usize>,
}

impl SchemaBuilder {
    fn observe(&mut self, name: &str, field_type: FieldType) {
        match self.index.get(name) {
            Some(&i) => {
                let current = &mut self.fields[i].field_type;
                if *current != field_type {
                    *current = widen(current, &field_type);
                }
            }
            None => {
                self.index.insert(name.to_string(), self.fields.len());
                self.fields.push(FieldDef::new(name, field_type));
            }
        }
    }

    fn finish(self) -> Vec<FieldDef> {
        self.fields
    }
}

fn widen(a: &FieldType, b: &FieldType) -> FieldType {
    match (a, b) {
        (FieldType::Integer, FieldType::Real) | (FieldType::Real, FieldType::Integer) => {
            FieldType::Real
        }
        _ => FieldType::String,
    }
}
