//! Coordinate transformations between geographic extents and pixel space.

pub mod transform;

pub use transform::CoordTransform;
