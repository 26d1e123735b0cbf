//! Shared test utilities for the UTFGrid workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Polygon and attribute fixtures
//! - Seeded random feature generators
//! - GeoJSON builders and temporary files
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{square, named_attributes};
//! ```

pub mod files;
pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use files::*;
pub use fixtures::*;
pub use generators::*;

/// Assert that two numbers differ by at most `epsilon`.
///
/// Both sides are widened to `f64`, so pixel sizes given as `u32` compare
/// directly against projected coordinates.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// let (x, _) = transform.forward(extent.max_x, extent.max_y);
/// assert_approx_eq!(x, request.width, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $epsilon:expr) => {{
        let actual = $actual as f64;
        let expected = $expected as f64;
        let epsilon = $epsilon as f64;
        let diff = (actual - expected).abs();
        assert!(
            diff <= epsilon,
            "{} = {} is not within {} of {} (off by {})",
            stringify!($actual),
            actual,
            epsilon,
            expected,
            diff
        );
    }};
}

/// [`assert_approx_eq!`] for both components of an `(x, y)` pair.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}
