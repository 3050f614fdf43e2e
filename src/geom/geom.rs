use geo::{BoundingRect, Contains, MultiPolygon, Point};
use rstar::{RTree, AABB};

use crate::geom::BoundingBox;

/// The polygons of one boundary layer, indexed by an R-tree over their bounding boxes.
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
    epsg: Option<u32>, // EPSG code, if known
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    /// Empty polygons are kept for row alignment but never indexed.
    pub(crate) fn new(shapes: Vec<MultiPolygon<f64>>, epsg: Option<u32>) -> Self {
        let rtree = RTree::bulk_load(
            shapes.iter().enumerate()
                .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                .collect()
        );
        Self { shapes, rtree, epsg }
    }

    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    #[inline] pub(crate) fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    #[inline] pub(crate) fn epsg(&self) -> Option<u32> { self.epsg }

    /// Index of the first polygon (in layer order) strictly containing `point`.
    /// Points on a boundary are not contained.
    pub(crate) fn locate(&self, point: Point<f64>) -> Option<usize> {
        let envelope = AABB::from_point([point.x(), point.y()]);
        self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(BoundingBox::idx)
            .filter(|&i| self.shapes[i].contains(&point))
            .min()
    }
}
