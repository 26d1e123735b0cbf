//! In-memory feature grid produced by the rasterizer.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use grid_common::AttributeRecord;

/// Identifier of a feature, read from the source's id field.
pub type FeatureId = i64;

/// Resolution used when none is given.
pub const DEFAULT_RESOLUTION: u32 = 4;

/// Content of one grid cell.
///
/// `Empty` is a distinguished marker, never equal to any feature id. It is
/// keyed by the empty string in the encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridCell {
    Empty,
    Feature(FeatureId),
}

impl GridCell {
    /// The key string used in the encoded `keys` list.
    pub fn key(&self) -> String {
        match self {
            GridCell::Empty => String::new(),
            GridCell::Feature(id) => id.to_string(),
        }
    }

    pub fn feature_id(&self) -> Option<FeatureId> {
        match self {
            GridCell::Empty => None,
            GridCell::Feature(id) => Some(*id),
        }
    }
}

/// Row-major grid of cells plus the attribute records of the features in it.
///
/// Each cell covers `resolution` x `resolution` source pixels. Rows are
/// appended once per scan line and not modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<GridCell>>,
    feature_cache: HashMap<FeatureId, AttributeRecord>,
    resolution: u32,
}

impl Grid {
    /// Create an empty grid.
    ///
    /// # Panics
    /// If `resolution` is zero.
    pub fn new(resolution: u32) -> Self {
        assert!(resolution >= 1, "grid resolution must be at least 1");
        Self {
            rows: Vec::new(),
            feature_cache: HashMap::new(),
            resolution,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Append a completed scan line.
    pub fn push_row(&mut self, row: Vec<GridCell>) {
        self.rows.push(row);
    }

    /// Cache the attributes of a feature. The first record stored for an id
    /// is kept; later ones are ignored. Returns true if the record was stored.
    pub fn cache_feature(&mut self, id: FeatureId, record: AttributeRecord) -> bool {
        match self.feature_cache.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Cached attributes of a feature.
    pub fn feature(&self, id: FeatureId) -> Option<&AttributeRecord> {
        self.feature_cache.get(&id)
    }

    /// Attributes of the feature owning a cell, or `None` for empty or
    /// out-of-range cells.
    pub fn attributes_at(&self, row: usize, col: usize) -> Option<&AttributeRecord> {
        self.cell(row, col)?
            .feature_id()
            .and_then(|id| self.feature(id))
    }

    pub fn rows(&self) -> &[Vec<GridCell>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<GridCell> {
        self.rows.get(row)?.get(col).copied()
    }

    /// Number of cells per row.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of distinct features with cached attributes.
    pub fn feature_count(&self) -> usize {
        self.feature_cache.len()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}
