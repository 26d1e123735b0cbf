//! Affine pixel transform for a map request.
//!
//! Geographic Y grows northward while pixel rows grow downward, so the
//! transform flips the vertical axis around the top of the extent:
//!
//! ```text
//! px = (lon - min_x) * sx - offset_x
//! py = (max_y - lat) * sy - offset_y
//! ```
//!
//! with `sx = width / extent.width()` and `sy = height / extent.height()`.

use grid_common::{Extent, Request};

/// Maps between geographic coordinates and pixel coordinates of a [`Request`].
///
/// The extent of the request must have positive width and height. A
/// degenerate extent yields infinite scale factors and non-finite results;
/// it is not clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordTransform {
    request: Request,
    /// Sub-pixel shift subtracted from forward results
    offset_x: f64,
    offset_y: f64,
    /// Pixels per coordinate unit
    sx: f64,
    sy: f64,
}

impl CoordTransform {
    /// Create a transform with no pixel offset.
    pub fn new(request: Request) -> Self {
        Self::with_offset(request, 0.0, 0.0)
    }

    /// Create a transform whose pixel origin is shifted by `(offset_x, offset_y)`.
    pub fn with_offset(request: Request, offset_x: f64, offset_y: f64) -> Self {
        let extent = request.extent;
        debug_assert!(
            extent.width() > 0.0 && extent.height() > 0.0,
            "degenerate extent {}",
            extent
        );

        Self {
            request,
            offset_x,
            offset_y,
            sx: request.width as f64 / extent.width(),
            sy: request.height as f64 / extent.height(),
        }
    }

    /// Geographic (lon, lat) to pixel (x, y).
    #[inline]
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let extent = &self.request.extent;
        let x = (lon - extent.min_x) * self.sx - self.offset_x;
        let y = (extent.max_y - lat) * self.sy - self.offset_y;
        (x, y)
    }

    /// Pixel (x, y) to geographic (lon, lat).
    #[inline]
    pub fn backward(&self, x: f64, y: f64) -> (f64, f64) {
        let extent = &self.request.extent;
        let lon = extent.min_x + (x + self.offset_x) / self.sx;
        let lat = extent.max_y - (y + self.offset_y) / self.sy;
        (lon, lat)
    }

    /// Geographic footprint of the pixel block from `(x, y)` spanning
    /// `size` pixels on each axis.
    pub fn pixel_block_extent(&self, x: f64, y: f64, size: f64) -> Extent {
        let (min_x, max_y) = self.backward(x, y);
        let (max_x, min_y) = self.backward(x + size, y + size);
        Extent::new(min_x, min_y, max_x, max_y)
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn extent(&self) -> &Extent {
        &self.request.extent
    }

    /// Scale factors (sx, sy) in pixels per coordinate unit.
    pub fn scale(&self) -> (f64, f64) {
        (self.sx, self.sy)
    }
}
