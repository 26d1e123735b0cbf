//! Common test fixtures for UTFGrid tests.
//!
//! Polygons, schemas and attribute sets shared by the renderer and CLI tests.

use geo_types::{LineString, Polygon};
use grid_common::{AttributeRecord, AttributeValue, Extent, FieldDef, FieldType, FieldValue};

/// A polygon plus the attributes of the feature it belongs to.
pub type FixtureFeature = (Polygon<f64>, Vec<(String, FieldValue)>);

/// Common extent definitions for testing.
pub mod extents {
    /// 4 x 4 unit square at the origin
    pub const UNIT_4X4: (f64, f64, f64, f64) = (0.0, 0.0, 4.0, 4.0);

    /// Swiss LV03 tile around Bern used by the municipality export
    pub const SWISS_MUNICIPALITIES: (f64, f64, f64, f64) = (622000.0, 125000.0, 632000.0, 135000.0);

    /// Global lon/lat
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);
}

/// Build an [`Extent`] from one of the tuples in [`extents`].
pub fn extent(bounds: (f64, f64, f64, f64)) -> Extent {
    Extent::new(bounds.0, bounds.1, bounds.2, bounds.3)
}

/// Axis-aligned square (or rectangle) polygon, closed, clockwise from the
/// lower-left corner.
pub fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (min_x, min_y),
            (min_x, max_y),
            (max_x, max_y),
            (max_x, min_y),
            (min_x, min_y),
        ]),
        vec![],
    )
}

/// Schema with an integer `id` and a string `name`.
pub fn named_schema() -> Vec<FieldDef> {
    vec![
        FieldDef::new("id", FieldType::Integer),
        FieldDef::new("name", FieldType::String),
    ]
}

/// Attributes matching [`named_schema`].
pub fn named_attributes(id: i64, name: &str) -> Vec<(String, FieldValue)> {
    vec![
        ("id".to_string(), FieldValue::Integer(id)),
        ("name".to_string(), FieldValue::String(name.to_string())),
    ]
}

/// Expected attribute record for [`named_attributes`].
pub fn named_record(id: i64, name: &str) -> AttributeRecord {
    let mut record = AttributeRecord::new();
    record.insert("id".to_string(), AttributeValue::Integer(id));
    record.insert("name".to_string(), AttributeValue::Text(name.to_string()));
    record
}
