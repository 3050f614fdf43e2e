use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, MapCoords};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::geom::Geometries;

/// EPSG code of WGS84 lon/lat, the common reference for all joins.
pub(crate) const WGS84: u32 = 4326;

/// PROJ.4 definition for the supported source and target CRSs.
fn proj4_definition(epsg: u32) -> Result<&'static str> {
    Ok(match epsg {
        4269 => "+proj=longlat +datum=NAD83 +no_defs +type=crs",
        4326 => "+proj=longlat +datum=WGS84 +no_defs +type=crs",
        3857 => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +no_defs +type=crs",
        other => bail!("unsupported coordinate reference system EPSG:{other}"),
    })
}

/// Geographic CRSs take and return radians in proj4rs; everything else is in meters.
#[inline]
fn is_geographic(epsg: u32) -> bool { matches!(epsg, 4269 | 4326) }

impl Geometries {
    /// Reproject every polygon into `epsg`, returning a freshly indexed copy.
    /// Errors if the source CRS is unknown or unsupported.
    pub(crate) fn reproject(&self, epsg: u32) -> Result<Self> {
        let source = self.epsg()
            .ok_or_else(|| anyhow!("cannot reproject geometries with unknown CRS"))?;
        if source == epsg { return Ok(self.clone()) }

        let from = Proj4::from_proj_string(proj4_definition(source)?)
            .map_err(|e| anyhow!("{e:?}"))
            .with_context(|| format!("failed to build source PROJ.4 for EPSG:{source}"))?;
        let to = Proj4::from_proj_string(proj4_definition(epsg)?)
            .map_err(|e| anyhow!("{e:?}"))
            .with_context(|| format!("failed to build target PROJ.4 for EPSG:{epsg}"))?;

        let (source_geog, target_geog) = (is_geographic(source), is_geographic(epsg));

        let shapes = self.shapes().iter()
            .map(|shape| shape.try_map_coords(|coord: Coord<f64>| {
                let mut point = if source_geog { (coord.x.to_radians(), coord.y.to_radians(), 0.0) }
                    else { (coord.x, coord.y, 0.0) };
                transform(&from, &to, &mut point).map(|()| {
                    if target_geog { Coord { x: point.0.to_degrees(), y: point.1.to_degrees() } }
                    else { Coord { x: point.0, y: point.1 } }
                })
            }))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow!("CRS transform EPSG:{source} -> EPSG:{epsg} failed: {e:?}"))?;

        Ok(Self::new(shapes, Some(epsg)))
    }
}

#[cfg(test)]
mod tests {
    use geo::{polygon, BoundingRect, MultiPolygon};

    use super::*;

    fn bounds(geoms: &Geometries) -> geo::Rect<f64> {
        geoms.shapes()[0].bounding_rect().unwrap()
    }

    #[test]
    fn web_mercator_to_wgs84() {
        let merc = Geometries::new(vec![MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0), (x: 10018754.171394622, y: 0.0), (x: 10018754.171394622, y: 1118889.9748579597), (x: 0.0, y: 1118889.9748579597),
        ]])], Some(3857));

        let wgs = merc.reproject(WGS84).unwrap();
        let rect = bounds(&wgs);
        assert_eq!(wgs.epsg(), Some(WGS84));
        assert!((rect.min().x - 0.0).abs() < 1e-6);
        assert!((rect.max().x - 90.0).abs() < 1e-6);
        assert!((rect.max().y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn nad83_is_close_to_wgs84() {
        let nad83 = Geometries::new(vec![MultiPolygon(vec![polygon![
            (x: -105.0, y: 39.0), (x: -104.0, y: 39.0), (x: -104.0, y: 40.0), (x: -105.0, y: 40.0),
        ]])], Some(4269));

        let rect = bounds(&nad83.reproject(WGS84).unwrap());
        assert!((rect.min().x + 105.0).abs() < 1e-4);
        assert!((rect.max().y - 40.0).abs() < 1e-4);
    }

    #[test]
    fn same_crs_is_identity() {
        let geoms = Geometries::new(vec![MultiPolygon(vec![polygon![
            (x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0),
        ]])], Some(WGS84));
        assert_eq!(geoms.reproject(WGS84).unwrap().shapes(), geoms.shapes());
    }

    #[test]
    fn unknown_crs_is_an_error() {
        let geoms = Geometries::new(vec![], None);
        assert!(geoms.reproject(WGS84).is_err());
        let geoms = Geometries::new(vec![], Some(32615));
        assert!(geoms.reproject(WGS84).is_err());
    }
}
