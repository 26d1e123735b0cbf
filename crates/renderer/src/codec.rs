//! UTFGrid encoding and lookup.
//!
//! Each distinct cell value gets one character, assigned in first-encounter
//! order (row-major) starting at U+0020. The quote (34) and backslash (92)
//! codepoints are skipped so rows embed in JSON strings without escapes:
//!
//! ```text
//! key index:  0  1  2  3 ... 58  59  60 ...
//! codepoint: 32 33 35 36 ... 91  93  94 ...
//! ```
//!
//! Decoding undoes the two skips and the base offset.

use std::collections::{BTreeMap, HashMap};

use grid_common::{AttributeRecord, GridError, GridResult};
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, GridCell};

/// Codepoint of the first assigned key.
pub const FIRST_CODEPOINT: u32 = 32;

const QUOTE: u32 = 34;
const BACKSLASH: u32 = 92;

/// Bump codepoints that cannot appear unescaped in a JSON string.
#[inline]
pub fn escape_codepoint(codepoint: u32) -> u32 {
    match codepoint {
        QUOTE | BACKSLASH => codepoint + 1,
        _ => codepoint,
    }
}

/// Key index encoded by a grid character, or `None` below the first codepoint.
#[inline]
pub fn decode_id(ch: char) -> Option<usize> {
    let mut codepoint = ch as u32;
    if codepoint > BACKSLASH {
        codepoint -= 1;
    }
    if codepoint > QUOTE {
        codepoint -= 1;
    }
    codepoint
        .checked_sub(FIRST_CODEPOINT)
        .map(|index| index as usize)
}

/// Portable grid representation: `{"grid": [...], "keys": [...], "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtfGrid {
    /// One string per row, one character per cell
    pub grid: Vec<String>,
    /// Key strings in codepoint order; the empty cell is ""
    pub keys: Vec<String>,
    /// Attribute records keyed by feature id string
    pub data: BTreeMap<String, AttributeRecord>,
}

impl UtfGrid {
    /// Key of the cell at `(row, col)`.
    pub fn key_at(&self, row: usize, col: usize) -> GridResult<&str> {
        let line = self.grid.get(row).ok_or_else(|| {
            GridError::InvalidLookup(format!("row {} outside grid of {} rows", row, self.grid.len()))
        })?;
        let ch = line.chars().nth(col).ok_or_else(|| {
            GridError::InvalidLookup(format!("column {} outside row {}", col, row))
        })?;
        let index = decode_id(ch).ok_or_else(|| {
            GridError::InvalidLookup(format!("character U+{:04X} is not a grid key", ch as u32))
        })?;
        self.keys.get(index).map(String::as_str).ok_or_else(|| {
            GridError::InvalidLookup(format!(
                "key index {} outside {} keys",
                index,
                self.keys.len()
            ))
        })
    }

    /// Attributes of the feature at `(row, col)`; `None` when the cell has
    /// no data.
    pub fn resolve(&self, row: usize, col: usize) -> GridResult<Option<&AttributeRecord>> {
        let key = self.key_at(row, col)?;
        Ok(self.data.get(key))
    }

    /// Hit-test a source pixel of a grid rendered at `resolution`.
    pub fn resolve_pixel(
        &self,
        x: u32,
        y: u32,
        resolution: u32,
    ) -> GridResult<Option<&AttributeRecord>> {
        if resolution == 0 {
            return Err(GridError::InvalidLookup("resolution must be at least 1".to_string()));
        }
        self.resolve((y / resolution) as usize, (x / resolution) as usize)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.grid.len()
    }

    /// Number of cells in the first row.
    pub fn width(&self) -> usize {
        self.grid.first().map_or(0, |row| row.chars().count())
    }
}

/// Encode a grid into its portable representation.
///
/// Output depends only on the grid contents, so encoding the same grid twice
/// yields identical results. Fails once the key space would run into the
/// UTF-16 surrogate range.
pub fn encode(grid: &Grid) -> GridResult<UtfGrid> {
    let mut assigned: HashMap<GridCell, char> = HashMap::new();
    let mut key_order: Vec<GridCell> = Vec::new();
    let mut data = BTreeMap::new();
    let mut codepoint = FIRST_CODEPOINT;

    let mut rows = Vec::with_capacity(grid.height());
    for row in grid.rows() {
        let mut encoded = String::with_capacity(row.len());
        for cell in row {
            let ch = match assigned.get(cell) {
                Some(&ch) => ch,
                None => {
                    codepoint = escape_codepoint(codepoint);
                    let ch = char::from_u32(codepoint)
                        .ok_or(GridError::KeySpaceExhausted(key_order.len() + 1))?;
                    assigned.insert(*cell, ch);
                    key_order.push(*cell);

                    if let Some(record) = cell.feature_id().and_then(|id| grid.feature(id)) {
                        if !record.is_empty() {
                            data.insert(cell.key(), record.clone());
                        }
                    }

                    codepoint += 1;
                    ch
                }
            };
            encoded.push(ch);
        }
        rows.push(encoded);
    }

    tracing::debug!(
        rows = rows.len(),
        keys = key_order.len(),
        features = data.len(),
        "Encoded grid"
    );

    Ok(UtfGrid {
        grid: rows,
        keys: key_order.iter().map(GridCell::key).collect(),
        data,
    })
}

impl Grid {
    /// Encode this grid. See [`encode`].
    pub fn encode(&self) -> GridResult<UtfGrid> {
        encode(self)
    }
}
