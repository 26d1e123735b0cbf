//! Polygon-to-grid rasterization.
//!
//! Every cell covers `resolution` x `resolution` request pixels. The cell's
//! pixel block is projected back to a geographic rectangle and the features
//! are scanned in source order; the first one overlapping the rectangle owns
//! the cell. Later features covering the same cell are never considered, so
//! the result depends on source order, not on overlap size.

use std::time::Instant;

use geo_types::{LineString, Polygon};
use grid_common::{
    AttributeRecord, FieldDef, GridError, GridResult, ScalarKind,
};
use projection::CoordTransform;
use rayon::prelude::*;

use crate::grid::{FeatureId, Grid, GridCell, DEFAULT_RESOLUTION};
use crate::source::{FeatureSource, SourceFeature};

/// A requested field present in the source schema.
#[derive(Debug, Clone, PartialEq)]
struct SelectedField {
    name: String,
    kind: ScalarKind,
}

/// Rasterizes a feature source into a [`Grid`].
#[derive(Debug, Clone)]
pub struct Renderer {
    transform: CoordTransform,
    id_field: String,
    resolution: u32,
}

impl Renderer {
    /// Create a renderer reading feature ids from `id_field`.
    pub fn new(transform: CoordTransform, id_field: impl Into<String>) -> Self {
        Self {
            transform,
            id_field: id_field.into(),
            resolution: DEFAULT_RESOLUTION,
        }
    }

    /// Set the number of pixels per cell along each axis.
    ///
    /// # Panics
    /// If `resolution` is zero.
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        assert!(resolution >= 1, "grid resolution must be at least 1");
        self.resolution = resolution;
        self
    }

    pub fn transform(&self) -> &CoordTransform {
        &self.transform
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Rasterize `source`, extracting `field_names` for every feature that
    /// owns at least one cell.
    ///
    /// Names missing from the source schema are ignored; if none remain, or
    /// the id field is not among them, nothing is rendered.
    pub fn apply<S, N>(&self, source: &S, field_names: &[N]) -> GridResult<Grid>
    where
        S: FeatureSource,
        N: AsRef<str>,
    {
        let start = Instant::now();
        let fields = self.select_fields(source.schema(), field_names)?;
        let features = self.materialize(source)?;

        let owners: Vec<Vec<Option<usize>>> = self
            .scan_lines()
            .map(|y| self.owner_row(&features, y))
            .collect();

        self.build_grid(&fields, &features, owners, start)
    }

    /// Same result as [`apply`](Self::apply), with scan lines searched on
    /// the rayon thread pool.
    ///
    /// Only the owner search runs in parallel. Attribute extraction and the
    /// feature cache are filled afterwards in row-major order, so the first
    /// writer for each id is the same as in a sequential scan.
    pub fn apply_parallel<S, N>(&self, source: &S, field_names: &[N]) -> GridResult<Grid>
    where
        S: FeatureSource,
        S::Feature: Sync,
        N: AsRef<str>,
    {
        let start = Instant::now();
        let fields = self.select_fields(source.schema(), field_names)?;
        let features = self.materialize(source)?;

        let lines: Vec<u32> = self.scan_lines().collect();
        let owners: Vec<Vec<Option<usize>>> = lines
            .par_iter()
            .map(|&y| self.owner_row(&features, y))
            .collect();

        self.build_grid(&fields, &features, owners, start)
    }

    fn select_fields<N: AsRef<str>>(
        &self,
        schema: &[FieldDef],
        field_names: &[N],
    ) -> GridResult<Vec<SelectedField>> {
        let fields: Vec<SelectedField> = schema
            .iter()
            .filter(|def| field_names.iter().any(|n| n.as_ref() == def.name))
            .map(|def| SelectedField {
                name: def.name.clone(),
                kind: ScalarKind::from(&def.field_type),
            })
            .collect();

        for name in field_names {
            let name = name.as_ref();
            if !fields.iter().any(|f| f.name == name) {
                tracing::warn!(field = name, "Requested field not in source schema");
            }
        }

        if fields.is_empty() {
            return Err(GridError::NoValidFields {
                requested: field_names.iter().map(|n| n.as_ref().to_string()).collect(),
            });
        }
        if !fields.iter().any(|f| f.name == self.id_field) {
            return Err(GridError::IdFieldNotSelected(self.id_field.clone()));
        }

        Ok(fields)
    }

    /// Fetch all candidate features once; cells never go back to the source.
    fn materialize<S: FeatureSource>(&self, source: &S) -> GridResult<Vec<S::Feature>> {
        let features = source.features_in(self.transform.extent())?;
        tracing::debug!(
            features = features.len(),
            extent = %self.transform.extent(),
            "Materialized features"
        );
        Ok(features)
    }

    /// Pixel row of each scan line.
    fn scan_lines(&self) -> impl Iterator<Item = u32> {
        (0..self.transform.request().height).step_by(self.resolution as usize)
    }

    /// Pixel column of each cell in a scan line.
    fn scan_columns(&self) -> impl Iterator<Item = u32> {
        (0..self.transform.request().width).step_by(self.resolution as usize)
    }

    /// Geographic rectangle covered by the cell whose top-left pixel is `(x, y)`.
    fn cell_polygon(&self, x: u32, y: u32) -> Polygon<f64> {
        let block = self
            .transform
            .pixel_block_extent(x as f64, y as f64, self.resolution as f64);
        let (min_x, min_y, max_x, max_y) = (block.min_x, block.min_y, block.max_x, block.max_y);

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

    /// Index of the first overlapping feature for each cell of a scan line.
    fn owner_row<F: SourceFeature>(&self, features: &[F], y: u32) -> Vec<Option<usize>> {
        self.scan_columns()
            .map(|x| {
                let cell = self.cell_polygon(x, y);
                features.iter().position(|f| f.intersects(&cell))
            })
            .collect()
    }

    fn build_grid<F: SourceFeature>(
        &self,
        fields: &[SelectedField],
        features: &[F],
        owners: Vec<Vec<Option<usize>>>,
        start: Instant,
    ) -> GridResult<Grid> {
        let mut grid = Grid::new(self.resolution);
        // Feature index -> id, filled on first hit
        let mut ids: Vec<Option<FeatureId>> = vec![None; features.len()];

        for owner_row in owners {
            let mut row = Vec::with_capacity(owner_row.len());
            for owner in owner_row {
                let cell = match owner {
                    None => GridCell::Empty,
                    Some(index) => {
                        let id = match ids[index] {
                            Some(id) => id,
                            None => {
                                let (id, record) = self.extract(fields, &features[index], index)?;
                                grid.cache_feature(id, record);
                                ids[index] = Some(id);
                                id
                            }
                        };
                        GridCell::Feature(id)
                    }
                };
                row.push(cell);
            }
            grid.push_row(row);
        }

        tracing::info!(
            rows = grid.height(),
            columns = grid.width(),
            resolution = self.resolution,
            features = grid.feature_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rasterized grid"
        );

        Ok(grid)
    }

    /// Read the selected attributes of a feature and derive its id.
    fn extract<F: SourceFeature>(
        &self,
        fields: &[SelectedField],
        feature: &F,
        index: usize,
    ) -> GridResult<(FeatureId, AttributeRecord)> {
        let mut record = AttributeRecord::new();
        for field in fields {
            let raw = feature
                .attribute(&field.name)
                .ok_or_else(|| GridError::MissingAttribute {
                    feature: index,
                    field: field.name.clone(),
                })?;
            record.insert(field.name.clone(), field.kind.coerce(&field.name, raw)?);
        }

        let id_value = record
            .get(&self.id_field)
            .ok_or_else(|| GridError::IdFieldNotSelected(self.id_field.clone()))?;
        let id = id_value
            .as_feature_id()
            .ok_or_else(|| GridError::InvalidFeatureId(id_value.to_string()))?;

        Ok((id, record))
    }
}
