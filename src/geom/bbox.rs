use geo::Rect;
use rstar::{PointDistance, RTreeObject, AABB};

use crate::layer::FeatureId;

/// A bounding box in an R-tree, associated with a feature by id.
#[derive(Debug, Clone)]
pub(super) struct BoundingBox {
    fid: FeatureId,
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub(super) fn new(fid: FeatureId, bbox: Rect<f64>) -> Self {
        Self { fid, bbox }
    }

    /// Get the id of the corresponding feature.
    pub(super) fn fid(&self) -> FeatureId { self.fid }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

impl PointDistance for BoundingBox {
    /// Squared distance from the box, zero inside it.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope().distance_2(point)
    }
}
