use geo::Rect;
use rstar::{RTreeObject, AABB};

/// Bounding rectangle of one polygon in a layer, keyed by the polygon's row index.
#[derive(Debug, Clone)]
pub(super) struct BoundingBox {
    idx: usize,
    envelope: AABB<[f64; 2]>,
}

impl BoundingBox {
    pub(super) fn new(idx: usize, rect: Rect<f64>) -> Self {
        Self { idx, envelope: AABB::from_corners(rect.min().into(), rect.max().into()) }
    }

    /// Row index of the polygon this box belongs to.
    #[inline] pub(super) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope { self.envelope }
}
