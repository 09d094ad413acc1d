use geo::{BoundingRect, Point, Rect};
use rstar::{RTree, AABB};
use tracing::debug;

use crate::error::{Error, Result};
use crate::layer::{FeatureId, FeatureRequest, Layer, LayerId};

use super::bbox::BoundingBox;

/// An R-tree over the bounding boxes of a layer's features.
///
/// The index is a snapshot: it remembers the layer and the revision it was built
/// from, and every query checks them. Once the layer has been edited the index
/// refuses to answer with [`Error::StaleIndex`]; rebuild it with [`SpatialIndex::build`].
/// Features without a geometry (or with an empty one) are not indexed.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    layer: LayerId,
    revision: u64,
    rtree: RTree<BoundingBox>,
}

impl SpatialIndex {
    /// Bulk-load an index from the current features of `layer`.
    pub fn build(layer: &Layer) -> Self {
        let boxes: Vec<BoundingBox> = layer.features(&FeatureRequest::all())
            .filter_map(|feature| {
                let bbox = feature.geometry.as_ref()?.bounding_rect()?;
                Some(BoundingBox::new(feature.id, bbox))
            })
            .collect();

        debug!(layer = layer.name(), entries = boxes.len(), "built spatial index");

        Self {
            layer: layer.id(),
            revision: layer.revision(),
            rtree: RTree::bulk_load(boxes),
        }
    }

    /// Number of indexed features.
    #[inline] pub fn len(&self) -> usize { self.rtree.size() }

    #[inline] pub fn is_empty(&self) -> bool { self.rtree.size() == 0 }

    /// True if `layer` is the layer this index was built from, unchanged since.
    pub fn is_current(&self, layer: &Layer) -> bool {
        self.layer == layer.id() && self.revision == layer.revision()
    }

    fn ensure_current(&self, layer: &Layer) -> Result<()> {
        if self.is_current(layer) { return Ok(()) }
        Err(Error::StaleIndex {
            layer: layer.id(),
            built: self.revision,
            current: layer.revision(),
        })
    }

    /// Ids of the features whose bounding box intersects `rect`, in ascending order.
    pub fn intersecting(&self, layer: &Layer, rect: Rect<f64>) -> Result<Vec<FeatureId>> {
        self.ensure_current(layer)?;
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());
        let mut ids: Vec<FeatureId> = self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(BoundingBox::fid)
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Ids of the `k` features whose bounding box is nearest to `point`, nearest first.
    pub fn nearest(&self, layer: &Layer, point: Point<f64>, k: usize) -> Result<Vec<FeatureId>> {
        self.ensure_current(layer)?;
        Ok(self.rtree.nearest_neighbor_iter(&[point.x(), point.y()])
            .take(k)
            .map(BoundingBox::fid)
            .collect())
    }
}
