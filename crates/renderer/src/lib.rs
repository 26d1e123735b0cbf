//! UTFGrid rendering for polygon features.
//!
//! - [`rasterizer`]: assigns each grid cell to the first feature overlapping it
//! - [`grid`]: the raw cell grid and its feature attribute cache
//! - [`codec`]: encoding to the `{grid, keys, data}` form and hit-testing
//! - [`source`], [`geojson_source`]: feature sources

pub mod codec;
pub mod geojson_source;
pub mod grid;
pub mod rasterizer;
pub mod source;

pub use codec::{decode_id, encode, escape_codepoint, UtfGrid};
pub use geojson_source::{load_geojson, load_geojson_file};
pub use grid::{FeatureId, Grid, GridCell, DEFAULT_RESOLUTION};
pub use rasterizer::Renderer;
pub use source::{FeatureSource, MemorySource, SourceFeature, VectorFeature};
