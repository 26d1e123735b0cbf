//! Tests for UTFGrid encoding and lookup on rasterized grids.

use grid_common::{FieldDef, FieldType, GridError, Request};
use projection::CoordTransform;
use renderer::{decode_id, Grid, GridCell, MemorySource, Renderer, UtfGrid, VectorFeature};
use test_utils::{
    checkerboard, extent, extents, named_attributes, named_record, named_schema, random_squares,
    square, FixtureFeature,
};

fn rasterize(
    bounds: (f64, f64, f64, f64),
    size: u32,
    resolution: u32,
    schema: Vec<FieldDef>,
    features: Vec<FixtureFeature>,
    fields: &[&str],
) -> Grid {
    let mut source = MemorySource::new(schema);
    for (polygon, attributes) in features {
        source.push(VectorFeature::new(polygon, attributes));
    }
    let request = Request::new(size, size, extent(bounds));
    Renderer::new(CoordTransform::new(request), "id")
        .with_resolution(resolution)
        .apply(&source, fields)
        .unwrap()
}

fn assert_round_trip(grid: &Grid, utf: &UtfGrid) {
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            assert_eq!(
                utf.resolve(row, col).unwrap(),
                grid.attributes_at(row, col),
                "cell ({}, {})",
                row,
                col
            );
        }
    }
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[test]
fn test_single_square_scenario() {
    let grid = rasterize(
        extents::UNIT_4X4,
        4,
        2,
        named_schema(),
        vec![(square(0.0, 0.0, 2.0, 2.0), named_attributes(7, "x"))],
        &["id", "name"],
    );
    let utf = grid.encode().unwrap();

    assert_eq!(utf.grid, vec!["  ".to_string(), "! ".to_string()]);
    assert_eq!(utf.keys, vec!["".to_string(), "7".to_string()]);
    assert_eq!(utf.data.len(), 1);

    assert_eq!(utf.resolve(1, 0).unwrap(), Some(&named_record(7, "x")));
    assert_eq!(utf.resolve(0, 0).unwrap(), None);
    assert_eq!(utf.resolve(0, 1).unwrap(), None);
    assert_eq!(utf.resolve(1, 1).unwrap(), None);

    // Source pixel (1, 3) falls in cell (1, 0)
    assert_eq!(utf.resolve_pixel(1, 3, 2).unwrap(), Some(&named_record(7, "x")));
}

// ============================================================================
// Round trip and escaping
// ============================================================================

#[test]
fn test_round_trip_past_reserved_codepoints() {
    // 100 distinct keys: assignment crosses both 34 and 92
    let grid = rasterize(
        (0.0, 0.0, 10.0, 10.0),
        10,
        1,
        named_schema(),
        checkerboard(10, 10, 1.0),
        &["id", "name"],
    );
    let utf = grid.encode().unwrap();

    assert_eq!(utf.keys.len(), 100);
    for row in &utf.grid {
        for ch in row.chars() {
            assert_ne!(ch, '"');
            assert_ne!(ch, '\\');
        }
    }
    assert_round_trip(&grid, &utf);
}

#[test]
fn test_round_trip_random_overlaps() {
    let bounds = extents::SWISS_MUNICIPALITIES;
    let mut schema = named_schema();
    schema.push(FieldDef::new("area", FieldType::Real));

    for seed in 0..4u64 {
        let features = random_squares(seed, 120, extent(bounds), 1500.0);
        let grid = rasterize(bounds, 48, 1, schema.clone(), features, &["id", "name", "area"]);
        let utf = grid.encode().unwrap();

        for row in &utf.grid {
            assert!(
                row.chars().all(|ch| ch as u32 != 34 && ch as u32 != 92),
                "seed {} produced a reserved codepoint",
                seed
            );
        }
        assert_round_trip(&grid, &utf);
    }
}

#[test]
fn test_keys_follow_codepoints() {
    let grid = rasterize(
        (0.0, 0.0, 10.0, 10.0),
        10,
        1,
        named_schema(),
        checkerboard(10, 10, 1.0),
        &["id", "name"],
    );
    let utf = grid.encode().unwrap();

    for (r, row) in utf.grid.iter().enumerate() {
        for (c, ch) in row.chars().enumerate() {
            let index = decode_id(ch).unwrap();
            let cell = grid.cell(r, c).unwrap();
            assert_eq!(utf.keys[index], cell.key());
        }
    }
}

/// Single row grid with `count` distinct feature ids.
fn distinct_ids(count: usize) -> Grid {
    let mut grid = Grid::new(1);
    grid.push_row((0..count as i64).map(GridCell::Feature).collect());
    grid
}

#[test]
fn test_key_space_ends_below_surrogates() {
    // 32..=0xD7FF minus the two skipped codepoints
    let utf = distinct_ids(55_262).encode().unwrap();
    let last = utf.grid[0].chars().last().unwrap();
    assert_eq!(last, '\u{D7FF}');
    assert_eq!(decode_id(last), Some(55_261));
    assert_eq!(utf.keys.len(), 55_262);

    let err = distinct_ids(55_263).encode().unwrap_err();
    assert!(matches!(err, GridError::KeySpaceExhausted(_)));
    assert_eq!(err.category(), grid_common::ErrorCategory::Data);
}

// ============================================================================
// Determinism and ordering
// ============================================================================

#[test]
fn test_encoding_is_deterministic() {
    let features = random_squares(99, 60, extent(extents::GLOBAL), 60.0);
    let mut schema = named_schema();
    schema.push(FieldDef::new("area", FieldType::Real));
    let grid = rasterize(extents::GLOBAL, 48, 2, schema, features, &["id", "name", "area"]);

    let first = grid.encode().unwrap();
    let second = grid.encode().unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_keys_in_first_encounter_order() {
    let mut grid = Grid::new(1);
    grid.push_row(vec![GridCell::Feature(30), GridCell::Feature(10), GridCell::Empty]);
    grid.push_row(vec![GridCell::Feature(20), GridCell::Feature(10), GridCell::Feature(30)]);

    let utf = grid.encode().unwrap();
    assert_eq!(utf.keys, vec!["30", "10", "", "20"]);
    assert_eq!(utf.grid, vec![" !#".to_string(), "$! ".to_string()]);
}

// ============================================================================
// Wire format
// ============================================================================

#[test]
fn test_json_round_trip_preserves_lookup() {
    let grid = rasterize(
        extents::UNIT_4X4,
        4,
        1,
        named_schema(),
        vec![
            (square(0.0, 0.0, 2.0, 4.0), named_attributes(1, "west")),
            (square(2.0, 0.0, 4.0, 4.0), named_attributes(2, "east")),
        ],
        &["id", "name"],
    );
    let utf = grid.encode().unwrap();

    let json = serde_json::to_string_pretty(&utf).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert!(object["grid"].is_array());
    assert!(object["keys"].is_array());
    assert!(object["data"].is_object());

    let parsed: UtfGrid = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.resolve(2, 3).unwrap(), Some(&named_record(2, "east")));
    assert_eq!(parsed.resolve(0, 0).unwrap(), Some(&named_record(1, "west")));
}

#[test]
fn test_resolve_rejects_foreign_characters() {
    let utf = UtfGrid {
        grid: vec!["\u{1}".to_string(), "!".to_string()],
        keys: vec!["".to_string()],
        data: Default::default(),
    };

    assert!(matches!(utf.resolve(0, 0), Err(GridError::InvalidLookup(_))));
    // '!' decodes to key 1, which is past the key list
    assert!(matches!(utf.resolve(1, 0), Err(GridError::InvalidLookup(_))));
}
