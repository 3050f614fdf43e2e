//! Metro-level enrichment: boundary attributes, population, ACS extracts, and density ratios.

use anyhow::{Context, Result};
use polars::prelude::*;
use wkt::ToWkt;

use crate::{aggregate::COUNT, columns::strip_columns, layer::{BoundaryLayer, LayerKind}};

pub(crate) const NAME: &str = "NAME";
pub(crate) const CSA_ID: &str = "CSAFP";
pub(crate) const LAND_AREA: &str = "ALAND";
/// Metro polygon as WKT text.
pub(crate) const GEOMETRY: &str = "geometry";

pub(crate) const POPULATION_CSA: &str = "CSA";
pub(crate) const POPULATION_LSAD: &str = "LSAD";
pub(crate) const POPULATION_BASE: &str = "ESTIMATESBASE2020";
pub(crate) const POPULATION_2022: &str = "POPESTIMATE2022";

/// LSAD value of CSA-level rows in the Census population estimates.
pub(crate) const CSA_LSAD: &str = "Combined Statistical Area";

pub(crate) const PER_TEN_THOUSAND_CAPITA: &str = "pertenthousandcapita";
pub(crate) const SQUARE_KM: &str = "squarekm";
pub(crate) const PER_THOUSAND_SQ_KM: &str = "perthousandsqkm";

/// Inner join on `left_key == right_key`, dropping the right key if the join kept it.
fn inner_join_on(left: &DataFrame, right: &DataFrame, left_key: &str, right_key: &str) -> Result<DataFrame> {
    right.column(right_key)
        .with_context(|| format!("join: missing key column {right_key:?}"))?;

    let joined = left.inner_join(right, [left_key], [right_key])?;
    if left_key != right_key && joined.get_column_index(right_key).is_some() {
        Ok(joined.drop(right_key)?)
    } else {
        Ok(joined)
    }
}

/// Keep CSA-level population rows, with the CSA code as a string.
pub fn filter_csa_populations(populations: &DataFrame) -> Result<DataFrame> {
    let mut df = populations.clone();
    let csa = df.column(POPULATION_CSA)
        .with_context(|| format!("population table is missing column {POPULATION_CSA:?}"))?
        .cast(&DataType::String)?;
    df.with_column(csa)?;

    let lsad = df.column(POPULATION_LSAD)
        .with_context(|| format!("population table is missing column {POPULATION_LSAD:?}"))?
        .cast(&DataType::String)?;
    let mask = lsad.str()?.into_iter()
        .map(|value| value == Some(CSA_LSAD))
        .collect::<BooleanChunked>();

    Ok(df.filter(&mask)?)
}

/// Attach the CSA id, land area and WKT polygon of each metro area, matched by name.
pub fn attach_metro_attributes(aggregates: &DataFrame, metro: &BoundaryLayer) -> Result<DataFrame> {
    let mut attributes = metro.data().select([NAME, CSA_ID, LAND_AREA])
        .context("metro layer is missing NAME, CSAFP or ALAND")?;
    let geometry = metro.shapes().iter()
        .map(|shape| shape.wkt_string())
        .collect::<Vec<_>>();
    attributes.with_column(Column::new(GEOMETRY.into(), geometry))?;
    inner_join_on(aggregates, &attributes, LayerKind::Metro.key_column(), NAME)
}

/// Attach 2020 base and 2022 population estimates by name, largest base population first.
pub fn attach_population(df: &DataFrame, populations: &DataFrame) -> Result<DataFrame> {
    let estimates = populations.select([NAME, POPULATION_BASE, POPULATION_2022])
        .context("population table is missing NAME, ESTIMATESBASE2020 or POPESTIMATE2022")?;

    Ok(inner_join_on(df, &estimates, LayerKind::Metro.key_column(), NAME)?
        .sort(
            [POPULATION_BASE],
            SortMultipleOptions::default().with_order_descending(true).with_nulls_last(true),
        )?)
}

/// Add chargers per 10k residents, land area in km², and chargers per 1000 km².
/// A ratio is null where its denominator is missing or not positive.
pub fn add_density_ratios(mut df: DataFrame) -> Result<DataFrame> {
    /// Read a column as optional floats
    fn floats(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
        let column = df.column(name)
            .with_context(|| format!("density ratios: missing column {name:?}"))?
            .cast(&DataType::Float64)?;
        Ok(column.f64()?.into_iter().collect())
    }

    /// `numerator / denominator * scale`, defined only for positive denominators
    fn ratio(numerator: Option<f64>, denominator: Option<f64>, scale: f64) -> Option<f64> {
        match (numerator, denominator) {
            (Some(n), Some(d)) if d > 0.0 => Some(n / d * scale),
            _ => None,
        }
    }

    let count = floats(&df, COUNT)?;
    let population = floats(&df, POPULATION_BASE)?;
    let square_km = floats(&df, LAND_AREA)?.into_iter()
        .map(|aland| aland.map(|m2| m2 / 1_000_000.0))
        .collect::<Vec<_>>();

    let per_capita = count.iter().zip(&population)
        .map(|(&c, &p)| ratio(c, p, 10_000.0))
        .collect::<Vec<_>>();
    let per_area = count.iter().zip(&square_km)
        .map(|(&c, &a)| ratio(c, a, 1_000.0))
        .collect::<Vec<_>>();

    df.with_column(Column::new(PER_TEN_THOUSAND_CAPITA.into(), per_capita))?;
    df.with_column(Column::new(SQUARE_KM.into(), square_km))?;
    df.with_column(Column::new(PER_THOUSAND_SQ_KM.into(), per_area))?;
    Ok(df)
}

/// Attach an ACS extract by name, with whitespace stripped from its column labels.
/// Areas missing from the extract are dropped. Labels already present in `df`
/// get a `_right` suffix.
pub fn attach_acs(df: &DataFrame, acs: &DataFrame) -> Result<DataFrame> {
    let mut acs = acs.clone();
    strip_columns(&mut acs)?;
    inner_join_on(df, &acs, LayerKind::Metro.key_column(), NAME)
        .context("failed to join ACS extract on NAME")
}
