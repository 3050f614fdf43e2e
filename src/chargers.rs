//! Charger station records: loading, fuel-type filtering, and deduplication.

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::debug;

use crate::io::{read_csv_with_encodings, CsvSource};
use crate::join::{LATITUDE, LONGITUDE};

pub(crate) const STATION_ID: &str = "ID";
pub(crate) const FUEL_TYPE: &str = "Fuel Type Code";
pub(crate) const CONNECTOR_TYPES: &str = "EV Connector Types";
pub(crate) const CITY: &str = "City";
pub(crate) const LEVEL1_PORTS: &str = "EV Level1 EVSE Num";
pub(crate) const LEVEL2_PORTS: &str = "EV Level2 EVSE Num";
pub(crate) const FAST_PORTS: &str = "EV DC Fast Count";

/// Fuel type code of electric charging stations.
pub(crate) const ELECTRIC: &str = "ELEC";

/// Read the charger table and coerce the columns the pipeline relies on.
/// Port counts become Float64 (missing counts stay null and sum as zero).
pub fn load_chargers<S: AsRef<str>>(source: &CsvSource, encodings: &[S]) -> Result<DataFrame> {
    let mut df = read_csv_with_encodings(source, encodings)?;

    for name in [STATION_ID, FUEL_TYPE, CONNECTOR_TYPES, CITY, LONGITUDE, LATITUDE] {
        df.column(name)
            .with_context(|| format!("charger table {source} is missing column {name:?}"))?;
    }

    for name in [LEVEL1_PORTS, LEVEL2_PORTS, FAST_PORTS] {
        let ports = df.column(name)
            .with_context(|| format!("charger table {source} is missing column {name:?}"))?
            .cast(&DataType::Float64)?;
        df.with_column(ports)?;
    }

    let connectors = df.column(CONNECTOR_TYPES)?.cast(&DataType::String)?;
    df.with_column(connectors)?;

    debug!(%source, rows = df.height(), "[chargers] loaded");
    Ok(df)
}

/// Keep only rows whose fuel type code is exactly `ELEC`.
pub fn filter_electric(df: &DataFrame) -> Result<DataFrame> {
    let fuel = df.column(FUEL_TYPE)?.cast(&DataType::String)?;
    let mask = fuel.str()?.into_iter()
        .map(|code| code == Some(ELECTRIC))
        .collect::<BooleanChunked>();
    Ok(df.filter(&mask)?)
}

/// Keep the first row for each station id. Missing ids count as one shared id.
pub fn dedup_by_station(df: &DataFrame) -> Result<DataFrame> {
    df.column(STATION_ID)
        .with_context(|| format!("dedup: missing column {STATION_ID:?}"))?;
    let subset = [STATION_ID.to_string()];
    Ok(df.unique_stable(Some(subset.as_slice()), UniqueKeepStrategy::First, None)?)
}
