//! Point-in-polygon join of charger locations against a boundary layer.

use anyhow::{Context, Result};
use geo::Point;
use polars::prelude::*;
use tracing::debug;

use crate::layer::BoundaryLayer;

/// Longitude column of the point table.
pub(crate) const LONGITUDE: &str = "Longitude";
/// Latitude column of the point table.
pub(crate) const LATITUDE: &str = "Latitude";

/// Left spatial join: attach the `columns` of the polygon containing each point.
///
/// Every input row is kept, in order. Points outside all polygons, or with missing
/// coordinates, get nulls. When an attached column name already exists in `points`,
/// the existing column is renamed with a `_left` suffix and the attached one gets `_right`.
pub fn spatial_join(points: &DataFrame, layer: &BoundaryLayer, columns: &[&str]) -> Result<DataFrame> {
    let lon = points.column(LONGITUDE)
        .with_context(|| format!("spatial_join: missing {LONGITUDE:?} column"))?
        .cast(&DataType::Float64)?;
    let lat = points.column(LATITUDE)
        .with_context(|| format!("spatial_join: missing {LATITUDE:?} column"))?
        .cast(&DataType::Float64)?;

    let rows = lon.f64()?.into_iter()
        .zip(lat.f64()?.into_iter())
        .map(|coords| match coords {
            (Some(x), Some(y)) => layer.locate(Point::new(x, y)).map(|i| i as IdxSize),
            _ => None,
        })
        .collect::<IdxCa>();

    debug!(
        layer = layer.kind().to_str(),
        points = points.height(),
        matched = rows.len() - rows.null_count(),
        "[join] point-in-polygon"
    );

    let mut attributes = layer.data()
        .select(columns.iter().copied())
        .with_context(|| format!("spatial_join: {} layer lacks one of {columns:?}", layer.kind().to_str()))?
        .take(&rows)?;

    let mut joined = points.clone();
    for &name in columns {
        if joined.get_column_index(name).is_some() {
            joined.rename(name, format!("{name}_left").into())?;
            attributes.rename(name, format!("{name}_right").into())?;
        }
    }

    Ok(joined.hstack(attributes.get_columns())?)
}
