//! End-to-end tests for render jobs: GeoJSON in, UTFGrid JSON out.

use grid_common::{AttributeValue, GridError};
use test_utils::{
    checkerboard, extent, extents, named_attributes, named_record, square, temp_file_with,
    temp_geojson_file, FixtureFeature,
};
use utfgrid::config::{RenderConfig, RenderOverrides};
use utfgrid::job;

fn job_for(input: &std::path::Path, bbox: (f64, f64, f64, f64)) -> RenderConfig {
    RenderConfig {
        input: Some(input.to_path_buf()),
        bbox: Some(format!("{},{},{},{}", bbox.0, bbox.1, bbox.2, bbox.3)),
        fields: vec!["id".to_string(), "name".to_string()],
        ..Default::default()
    }
}

fn two_squares() -> Vec<FixtureFeature> {
    vec![
        (square(0.0, 0.0, 2.0, 2.0), named_attributes(7, "x")),
        (square(2.0, 2.0, 4.0, 4.0), named_attributes(8, "y")),
    ]
}

// ============================================================================
// Render
// ============================================================================

#[test]
fn test_render_single_square() {
    let input = temp_geojson_file(&[(square(0.0, 0.0, 2.0, 2.0), named_attributes(7, "x"))]);
    let config = RenderConfig {
        width: 4,
        height: 4,
        resolution: 2,
        ..job_for(input.path(), extents::UNIT_4X4)
    };

    let rendered = job::render(&config).unwrap();
    assert_eq!(rendered.features, 1);
    assert_eq!(rendered.utfgrid.grid, vec!["  ", "! "]);
    assert_eq!(rendered.utfgrid.keys, vec!["", "7"]);
    assert_eq!(
        job::resolve(&rendered.utfgrid, 1, 0, None).unwrap(),
        Some(named_record(7, "x"))
    );
}

#[test]
fn test_render_writes_output_file() {
    let input = temp_geojson_file(&two_squares());
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("utfgrid.json");

    let config = RenderConfig {
        width: 4,
        height: 4,
        resolution: 1,
        output: Some(output.clone()),
        ..job_for(input.path(), extents::UNIT_4X4)
    };
    let rendered = job::render(&config).unwrap();
    job::write_output(&config, &rendered.utfgrid).unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("\n    \"grid\": ["));

    let read_back = job::read_utfgrid(&output).unwrap();
    assert_eq!(read_back, rendered.utfgrid);
    assert_eq!(
        job::resolve(&read_back, 0, 3, None).unwrap(),
        Some(named_record(8, "y"))
    );
    assert_eq!(
        job::resolve(&read_back, 3, 0, None).unwrap(),
        Some(named_record(7, "x"))
    );
    assert_eq!(job::resolve(&read_back, 0, 0, None).unwrap(), None);
}

#[test]
fn test_parallel_job_matches_sequential() {
    let input = temp_geojson_file(&checkerboard(8, 8, 1.0));
    let base = RenderConfig {
        width: 64,
        height: 64,
        resolution: 2,
        ..job_for(input.path(), (0.0, 0.0, 8.0, 8.0))
    };
    let parallel = base.clone().merge(RenderOverrides {
        parallel: true,
        ..Default::default()
    });

    let sequential = job::render(&base).unwrap().utfgrid;
    let parallel = job::render(&parallel).unwrap().utfgrid;
    assert_eq!(sequential, parallel);
    assert_eq!(sequential.keys.len(), 64);
}

#[test]
fn test_resolve_pixel_on_default_resolution() {
    let input = temp_geojson_file(&checkerboard(2, 2, 1.0));
    let config = job_for(input.path(), (0.0, 0.0, 2.0, 2.0));

    let utf = job::render(&config).unwrap().utfgrid;
    assert_eq!(utf.height(), 64);
    assert_eq!(utf.width(), 64);

    // Bottom-left tile has id 1; pixel (10, 200) sits in it
    let record = job::resolve(&utf, 200, 10, Some(4)).unwrap().unwrap();
    assert_eq!(record["id"], AttributeValue::Integer(1));
    let record = job::resolve(&utf, 10, 200, Some(4)).unwrap().unwrap();
    assert_eq!(record["id"], AttributeValue::Integer(4));
}

// ============================================================================
// Job files
// ============================================================================

#[test]
fn test_job_file_with_overrides() {
    let input = temp_geojson_file(&two_squares());
    let yaml = format!(
        "input: {}\nbbox: \"0,0,4,4\"\nwidth: 4\nheight: 4\nresolution: 2\nfields: [name]\n",
        input.path().display()
    );
    let job_file = temp_file_with(&yaml, ".yaml");

    let config = RenderConfig::from_file(job_file.path()).unwrap();
    // id is not selected in the file
    assert!(matches!(
        job::render(&config),
        Err(GridError::IdFieldNotSelected(_))
    ));

    let config = config.merge(RenderOverrides {
        fields: Some(vec!["name".to_string(), "id".to_string()]),
        ..Default::default()
    });
    let utf = job::render(&config).unwrap().utfgrid;
    assert_eq!(utf.grid, vec![" !", "# "]);
}

#[test]
fn test_missing_job_file() {
    let err = RenderConfig::from_file("/nonexistent/utfgrid/job.yaml").unwrap_err();
    assert!(matches!(err, GridError::Io(_)));
    assert_eq!(err.exit_code(), 4);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unknown_fields_only() {
    let input = temp_geojson_file(&two_squares());
    let config = RenderConfig {
        fields: vec!["gemname".to_string()],
        ..job_for(input.path(), extents::UNIT_4X4)
    };

    let err = job::render(&config).unwrap_err();
    assert!(matches!(err, GridError::NoValidFields { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_missing_input_file() {
    let config = job_for(
        std::path::Path::new("/nonexistent/utfgrid/input.geojson"),
        extents::UNIT_4X4,
    );
    assert!(matches!(job::render(&config), Err(GridError::Io(_))));
}

#[test]
fn test_point_geometry_is_data_error() {
    let input = temp_file_with(
        r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 1]}, "properties": {"id": 1}}"#,
        ".geojson",
    );
    let config = job_for(input.path(), extents::UNIT_4X4);

    let err = job::render(&config).unwrap_err();
    assert!(matches!(err, GridError::UnsupportedGeometry(_)));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_render_outside_features_is_empty() {
    let input = temp_geojson_file(&two_squares());
    let far = extent(extents::SWISS_MUNICIPALITIES);
    let config = RenderConfig {
        width: 8,
        height: 8,
        resolution: 4,
        ..job_for(input.path(), (far.min_x, far.min_y, far.max_x, far.max_y))
    };

    let utf = job::render(&config).unwrap().utfgrid;
    assert_eq!(utf.keys, vec![""]);
    assert!(utf.data.is_empty());
}
