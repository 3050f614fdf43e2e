//! Shapefile reading: polygon shapes, dBASE attributes, and `.prj` CRS detection.

use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use polars::prelude::*;
use shapefile::{dbase::{FieldValue, Record}, PolygonRing, Reader, Shape};

/// Reads all shapes + attribute records from a given `.shp` file path.
pub(crate) fn read_shapefile(path: &Path) -> Result<(Vec<Shape>, Vec<Record>)> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let count = reader.shape_count()?;
    let (mut shapes, mut records) = (Vec::with_capacity(count), Vec::with_capacity(count));
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result
            .with_context(|| format!("Error reading shape+record in {}", path.display()))?;
        shapes.push(shape);
        records.push(record);
    }

    Ok((shapes, records))
}

/// Coerce a shapefile polygon into a MultiPolygon, raising error if different shape.
/// Each outer ring starts a new polygon; inner rings become holes of the latest one.
pub(crate) fn shape_to_multipolygon(shape: Shape) -> Result<MultiPolygon<f64>> {
    let polygon = match shape {
        Shape::Polygon(polygon) => polygon,
        other => bail!("found non-Polygon shape in layer: {:?}", other.shapetype()),
    };

    let mut polygons: Vec<Polygon<f64>> = Vec::new();
    for ring in polygon.rings() {
        let line = ring.points().iter()
            .map(|point| Coord { x: point.x, y: point.y })
            .collect::<LineString<f64>>();

        match ring {
            PolygonRing::Outer(_) => polygons.push(Polygon::new(line, vec![])),
            PolygonRing::Inner(_) => polygons.last_mut()
                .ok_or_else(|| anyhow!("inner ring found before any outer ring"))?
                .interiors_push(line),
        }
    }

    Ok(MultiPolygon(polygons))
}

/// Build a DataFrame from the requested dBASE fields.
/// Character fields become String columns, numeric fields become Float64 columns.
pub(crate) fn records_to_dataframe(records: &[Record], fields: &[&str]) -> Result<DataFrame> {
    /// Convert one field across all records into a column
    fn field_column(records: &[Record], field: &str) -> Result<Column> {
        let values = records.iter()
            .map(|record| record.get(field)
                .ok_or_else(|| anyhow!("missing field {field:?} in shapefile record")))
            .collect::<Result<Vec<_>>>()?;

        let numeric = values.iter().any(|value| matches!(value,
            FieldValue::Numeric(_) | FieldValue::Float(_) | FieldValue::Double(_) | FieldValue::Integer(_)
        ));

        if numeric {
            let numbers = values.iter()
                .map(|value| match value {
                    FieldValue::Numeric(n) => Ok(*n),
                    FieldValue::Float(n) => Ok(n.map(f64::from)),
                    FieldValue::Double(n) => Ok(Some(*n)),
                    FieldValue::Integer(n) => Ok(Some(f64::from(*n))),
                    other => bail!("mixed types in numeric field {field:?}: {other:?}"),
                })
                .collect::<Result<Vec<Option<f64>>>>()?;
            Ok(Column::new(field.into(), numbers))
        } else {
            let strings = values.iter()
                .map(|value| match value {
                    FieldValue::Character(s) => Ok(s.as_ref().map(|s| s.trim().to_string())),
                    FieldValue::Memo(s) => Ok(Some(s.trim().to_string())),
                    other => bail!("unsupported type in field {field:?}: {other:?}"),
                })
                .collect::<Result<Vec<Option<String>>>>()?;
            Ok(Column::new(field.into(), strings))
        }
    }

    let columns = fields.iter()
        .map(|field| field_column(records, field))
        .collect::<Result<Vec<_>>>()?;

    Ok(DataFrame::new(columns)?)
}

/// Guess the EPSG code of a shapefile from its `.prj` sidecar, if present and recognized.
pub(crate) fn epsg_from_shapefile(path: &Path) -> Result<Option<u32>> {
    let prj = path.with_extension("prj");
    if !prj.exists() { return Ok(None) }

    let wkt = fs::read_to_string(&prj)
        .with_context(|| format!("Failed to read projection file: {}", prj.display()))?;
    Ok(epsg_from_wkt(&wkt))
}

/// Recognize the handful of CRS definitions used by Census and EIA boundary files.
fn epsg_from_wkt(wkt: &str) -> Option<u32> {
    let wkt = wkt.trim().to_ascii_lowercase();

    if wkt.starts_with("projcs") {
        let mercator = ["web_mercator", "pseudo-mercator", "popular visualisation"]
            .iter().any(|name| wkt.contains(name));
        return mercator.then_some(3857);
    }

    if wkt.contains("north_american_1983") || wkt.contains("nad83") { Some(4269) }
    else if wkt.contains("wgs_1984") || wkt.contains("wgs 84") || wkt.contains("wgs84") { Some(4326) }
    else { None }
}
