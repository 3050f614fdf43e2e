use std::path::Path;

use anyhow::{anyhow, ensure, Context, Result};
use geo::{MultiPolygon, Point};
use polars::frame::DataFrame;
use tracing::debug;

use crate::{common, geom::{Geometries, WGS84}, io::shp};
use super::LayerKind;

/// A read-only polygon layer: one attribute row per polygon, in the same order.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    kind: LayerKind,
    data: DataFrame,
    geoms: Geometries,
}

impl BoundaryLayer {
    /// Build a layer from an attribute table and its polygons.
    pub fn new(kind: LayerKind, data: DataFrame, shapes: Vec<MultiPolygon<f64>>, epsg: Option<u32>) -> Result<Self> {
        ensure!(
            data.height() == shapes.len(),
            "{} layer: {} attribute rows but {} polygons",
            kind.to_str(), data.height(), shapes.len()
        );
        data.column(kind.name_field())
            .with_context(|| format!("{} layer: missing name field {:?}", kind.to_str(), kind.name_field()))?;

        Ok(Self { kind, data, geoms: Geometries::new(shapes, epsg) })
    }

    /// Load a layer from a `.shp` file. The CRS is `epsg` if given, otherwise read from the `.prj` sidecar.
    pub fn from_shapefile(kind: LayerKind, path: &Path, epsg: Option<u32>) -> Result<Self> {
        common::require_file_exists(path)?;

        let (shapes, records) = shp::read_shapefile(path)?;
        let data = shp::records_to_dataframe(&records, kind.attribute_fields())
            .with_context(|| format!("Error reading attributes from shapefile: {}", path.display()))?;

        let shapes = shapes.into_iter()
            .map(shp::shape_to_multipolygon)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Error converting shapes to multipolygons in shapefile: {}", path.display()))?;

        let epsg = match epsg {
            Some(code) => Some(code),
            None => shp::epsg_from_shapefile(path)?,
        };
        debug!(layer = kind.to_str(), polygons = shapes.len(), ?epsg, "[layer] read {}", path.display());

        Self::new(kind, data, shapes, epsg)
    }

    /// Copy of this layer with polygons reprojected to WGS84 lon/lat.
    pub fn to_wgs84(&self) -> Result<Self> {
        let geoms = self.geoms.reproject(WGS84)
            .with_context(|| anyhow!("{} layer: reprojection to EPSG:{WGS84} failed", self.kind.to_str()))?;
        Ok(Self { kind: self.kind, data: self.data.clone(), geoms })
    }

    #[inline] pub fn kind(&self) -> LayerKind { self.kind }

    /// Attribute table, one row per polygon.
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Polygons in attribute row order.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { self.geoms.shapes() }

    #[inline] pub fn len(&self) -> usize { self.geoms.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geoms.len() == 0 }

    #[inline] pub fn epsg(&self) -> Option<u32> { self.geoms.epsg() }

    /// Row of the first polygon strictly containing `point`.
    #[inline]
    pub(crate) fn locate(&self, point: Point<f64>) -> Option<usize> { self.geoms.locate(point) }
}

#[cfg(test)]
mod tests {
    use geo::polygon;
    use polars::prelude::*;

    use super::*;

    fn square() -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)]])
    }

    #[test]
    fn rows_must_match_polygons() {
        let data = df!("NAME" => ["A", "B"]).unwrap();
        assert!(BoundaryLayer::new(LayerKind::Metro, data, vec![square()], Some(4326)).is_err());
    }

    #[test]
    fn name_field_is_required() {
        let data = df!("CSAFP" => ["148"]).unwrap();
        assert!(BoundaryLayer::new(LayerKind::Metro, data, vec![square()], Some(4326)).is_err());
    }

    #[test]
    fn wgs84_layer_is_unchanged() {
        let data = df!("NAME" => ["A"]).unwrap();
        let layer = BoundaryLayer::new(LayerKind::BalancingAuthority, data, vec![square()], Some(4326)).unwrap();
        let reprojected = layer.to_wgs84().unwrap();
        assert_eq!(reprojected.len(), 1);
        assert_eq!(reprojected.locate(Point::new(0.5, 0.5)), Some(0));
    }
}
