//! Feature sources consumed by the rasterizer.
//!
//! A source exposes an attribute schema and hands out the features inside a
//! region. Geometry tests are the source's business: the rasterizer only asks
//! each feature whether it overlaps a cell footprint.

use std::collections::HashMap;

use geo::{Area, BooleanOps, BoundingRect, Intersects};
use geo_types::{coord, MultiPolygon, Polygon, Rect};
use grid_common::{Extent, FieldDef, FieldValue, GridResult};

/// A feature as seen by the rasterizer.
pub trait SourceFeature {
    /// Whether this feature overlaps the cell footprint `cell`.
    fn intersects(&self, cell: &Polygon<f64>) -> bool;

    /// Raw value of attribute `name`, if the feature has one.
    fn attribute(&self, name: &str) -> Option<&FieldValue>;
}

/// Supplier of polygon features and their attribute schema.
pub trait FeatureSource {
    type Feature: SourceFeature;

    /// Attribute fields in source order.
    fn schema(&self) -> &[FieldDef];

    /// Features that may fall inside `region`, in source order.
    fn features_in(&self, region: &Extent) -> GridResult<Vec<Self::Feature>>;
}

/// A polygon feature held in memory.
#[derive(Debug, Clone)]
pub struct VectorFeature {
    geometry: MultiPolygon<f64>,
    bounds: Option<Rect<f64>>,
    attributes: HashMap<String, FieldValue>,
}

impl VectorFeature {
    pub fn new(
        geometry: impl Into<MultiPolygon<f64>>,
        attributes: impl IntoIterator<Item = (String, FieldValue)>,
    ) -> Self {
        let geometry = geometry.into();
        let bounds = geometry.bounding_rect();
        Self {
            geometry,
            bounds,
            attributes: attributes.into_iter().collect(),
        }
    }
}

impl SourceFeature for VectorFeature {
    /// A cell is overlapped when it shares a positive area with the feature.
    /// Contact along an edge or at a corner does not count.
    fn intersects(&self, cell: &Polygon<f64>) -> bool {
        let (Some(bounds), Some(cell_bounds)) = (self.bounds, cell.bounding_rect()) else {
            return false;
        };
        if !bounds.intersects(&cell_bounds) {
            return false;
        }

        let cell = MultiPolygon::new(vec![cell.clone()]);
        self.geometry.intersection(&cell).unsigned_area() > 0.0
    }

    fn attribute(&self, name: &str) -> Option<&FieldValue> {
        self.attributes.get(name)
    }
}

/// In-memory feature source. Features keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    schema: Vec<FieldDef>,
    features: Vec<VectorFeature>,
}

impl MemorySource {
    pub fn new(schema: Vec<FieldDef>) -> Self {
        Self {
            schema,
            features: Vec::new(),
        }
    }

    pub fn push(&mut self, feature: VectorFeature) {
        self.features.push(feature);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with_feature(mut self, feature: VectorFeature) -> Self {
        self.push(feature);
        self
    }

    pub fn features(&self) -> &[VectorFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FeatureSource for MemorySource {
    type Feature = VectorFeature;

    fn schema(&self) -> &[FieldDef] {
        &self.schema
    }

    fn features_in(&self, region: &Extent) -> GridResult<Vec<VectorFeature>> {
        let region = Rect::new(
            coord! { x: region.min_x, y: region.min_y },
            coord! { x: region.max_x, y: region.max_y },
        );

        Ok(self
            .features
            .iter()
            .filter(|f| f.bounds.is_some_and(|b| b.intersects(&region)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::LineString;
    use grid_common::FieldType;

    fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
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

    fn feature(poly: Polygon<f64>, id: i64) -> VectorFeature {
        VectorFeature::new(poly, [("id".to_string(), FieldValue::Integer(id))])
    }

    #[test]
    fn test_overlap_counts() {
        let f = feature(square(0.0, 0.0, 2.0, 2.0), 1);
        assert!(f.intersects(&square(1.0, 1.0, 3.0, 3.0)));
        assert!(f.intersects(&square(0.5, 0.5, 1.0, 1.0)));
        assert!(f.intersects(&square(-1.0, -1.0, 3.0, 3.0)));
    }

    #[test]
    fn test_boundary_contact_does_not_count() {
        let f = feature(square(0.0, 0.0, 2.0, 2.0), 1);
        assert!(!f.intersects(&square(2.0, 0.0, 4.0, 2.0)));
        assert!(!f.intersects(&square(2.0, 2.0, 4.0, 4.0)));
        assert!(!f.intersects(&square(5.0, 5.0, 6.0, 6.0)));
    }

    #[test]
    fn test_features_in_filters_by_region() {
        let source = MemorySource::new(vec![FieldDef::new("id", FieldType::Integer)])
            .with_feature(feature(square(0.0, 0.0, 1.0, 1.0), 1))
            .with_feature(feature(square(10.0, 10.0, 11.0, 11.0), 2))
            .with_feature(feature(square(0.5, 0.5, 3.0, 3.0), 3));

        let found = source.features_in(&Extent::new(0.0, 0.0, 4.0, 4.0)).unwrap();
        let ids: Vec<_> = found
            .iter()
            .map(|f| f.attribute("id").cloned())
            .collect();
        assert_eq!(
            ids,
            vec![Some(FieldValue::Integer(1)), Some(FieldValue::Integer(3))]
        );
    }
}
