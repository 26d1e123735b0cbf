//! Synthetic feature generators.
//!
//! Random generators take an explicit seed so failing cases reproduce.

use grid_common::{Extent, FieldValue};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::fixtures::{square, FixtureFeature};

/// Creates `count` random, possibly overlapping squares inside `extent`.
///
/// Feature ids run from 1 to `count` in generation order. Each feature has
/// `id`, `name` ("feature-{id}") and `area` attributes.
pub fn random_squares(seed: u64, count: usize, extent: Extent, max_size: f64) -> Vec<FixtureFeature> {
    let mut rng = StdRng::seed_from_u64(seed);

    (1..=count as i64)
        .map(|id| {
            let w = rng.gen_range(max_size * 0.1..max_size);
            let h = rng.gen_range(max_size * 0.1..max_size);
            let x = rng.gen_range(extent.min_x..extent.max_x);
            let y = rng.gen_range(extent.min_y..extent.max_y);

            let attributes = vec![
                ("id".to_string(), FieldValue::Integer(id)),
                ("name".to_string(), FieldValue::String(format!("feature-{}", id))),
                ("area".to_string(), FieldValue::Real(w * h)),
            ];
            (square(x, y, x + w, y + h), attributes)
        })
        .collect()
}

/// Tiles `cols` x `rows` squares of side `size` from the origin.
///
/// Ids are assigned row by row from the bottom: `row * cols + col + 1`.
pub fn checkerboard(cols: usize, rows: usize, size: f64) -> Vec<FixtureFeature> {
    let mut features = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let id = (row * cols + col + 1) as i64;
            let x = col as f64 * size;
            let y = row as f64 * size;
            features.push((
                square(x, y, x + size, y + size),
                vec![
                    ("id".to_string(), FieldValue::Integer(id)),
                    ("name".to_string(), FieldValue::String(format!("tile-{}-{}", col, row))),
                ],
            ));
        }
    }
    features
}
