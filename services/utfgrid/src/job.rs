//! Render and resolve jobs run by the CLI.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use grid_common::{AttributeRecord, GridError, GridResult};
use projection::CoordTransform;
use renderer::{load_geojson_file, Renderer, UtfGrid};
use serde::Serialize;
use tracing::info;

use crate::config::RenderConfig;

/// Outcome of a render job.
#[derive(Debug)]
pub struct RenderOutput {
    pub utfgrid: UtfGrid,
    pub features: usize,
    pub elapsed_ms: u64,
}

/// Load, rasterize and encode the job's features.
pub fn render(config: &RenderConfig) -> GridResult<RenderOutput> {
    let start = Instant::now();
    config.validate()?;

    let input = config.input.as_deref().ok_or_else(|| GridError::InvalidConfig {
        param: "input".to_string(),
        message: "no input file given".to_string(),
    })?;
    let source = load_geojson_file(input)?;
    info!(input = %input.display(), features = source.len(), "Loaded features");

    let renderer = Renderer::new(CoordTransform::new(config.request()?), config.id_field.as_str())
        .with_resolution(config.resolution);

    let grid = if config.parallel {
        renderer.apply_parallel(&source, config.fields.as_slice())?
    } else {
        renderer.apply(&source, config.fields.as_slice())?
    };
    let utfgrid = grid.encode()?;

    Ok(RenderOutput {
        utfgrid,
        features: grid.feature_count(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    })
}

/// Serialize a grid as JSON; `indent` 0 writes compact output.
pub fn write_utfgrid<W: Write>(utfgrid: &UtfGrid, writer: W, indent: usize) -> GridResult<()> {
    let mut writer = BufWriter::new(writer);
    if indent == 0 {
        serde_json::to_writer(&mut writer, utfgrid)?;
    } else {
        let indent = vec![b' '; indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        utfgrid.serialize(&mut serializer)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write the rendered grid to the configured output, or stdout.
pub fn write_output(config: &RenderConfig, utfgrid: &UtfGrid) -> GridResult<()> {
    match &config.output {
        Some(path) => {
            write_utfgrid(utfgrid, File::create(path)?, config.indent)?;
            info!(output = %path.display(), "Wrote UTFGrid");
        }
        None => write_utfgrid(utfgrid, io::stdout().lock(), config.indent)?,
    }
    Ok(())
}

/// Read a UTFGrid JSON file.
pub fn read_utfgrid(path: impl AsRef<Path>) -> GridResult<UtfGrid> {
    let file = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(io::BufReader::new(file))?)
}

/// Attributes at a grid cell, or at a source pixel when `resolution` is
/// given (`row` and `col` are then pixel coordinates).
pub fn resolve(
    utfgrid: &UtfGrid,
    row: u32,
    col: u32,
    resolution: Option<u32>,
) -> GridResult<Option<AttributeRecord>> {
    let record = match resolution {
        Some(resolution) => utfgrid.resolve_pixel(col, row, resolution)?,
        None => utfgrid.resolve(row as usize, col as usize)?,
    };
    Ok(record.cloned())
}
