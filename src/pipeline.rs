//! End-to-end run: load inputs, locate and aggregate chargers, enrich, write tables.

use anyhow::{ensure, Context, Result};
use polars::prelude::*;
use tracing::{info, warn};

use crate::{
    aggregate::aggregate_chargers,
    chargers::{dedup_by_station, filter_electric, load_chargers, CITY},
    columns::normalize_columns,
    common,
    config::PipelineConfig,
    enrich::{self, add_density_ratios, attach_acs, attach_metro_attributes, attach_population, filter_csa_populations},
    io::{read_csv_with_encodings, write_csv},
    join::spatial_join,
    layer::{BoundaryLayer, LayerKind},
};

pub const METRO_OUTPUT: &str = "output_data.csv";
pub const BALANCING_AUTHORITY_OUTPUT: &str = "balancing_authority_data.csv";
pub const CITY_OUTPUT: &str = "city_data.csv";

/// Time-series table with no source data behind it yet.
pub const METRO_OVERTIME_OUTPUT: &str = "metro_overtime_data.csv";

/// Everything a run reads, already parsed. Layers are in WGS84.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub metro: BoundaryLayer,
    pub balancing_authorities: BoundaryLayer,
    pub chargers: DataFrame,
    /// CSA-level population estimates
    pub populations: DataFrame,
    /// ACS extracts joined onto the metro table, in order
    pub acs: Vec<DataFrame>,
}

/// Published tables, with normalized column names.
#[derive(Debug, Clone)]
pub struct Outputs {
    pub metro: DataFrame,
    pub balancing_authorities: DataFrame,
    pub cities: DataFrame,
}

/// Read both boundary layers, the charger table, populations and ACS extracts.
pub fn load_inputs(config: &PipelineConfig) -> Result<Inputs> {
    let metro = BoundaryLayer::from_shapefile(LayerKind::Metro, &config.metro_shapefile_path(), config.metro_epsg)?
        .to_wgs84()?;
    let balancing_authorities = BoundaryLayer::from_shapefile(
        LayerKind::BalancingAuthority,
        &config.balancing_authority_shapefile_path(),
        config.balancing_authority_epsg,
    )?.to_wgs84()?;
    info!(metro = metro.len(), balancing_authorities = balancing_authorities.len(), "[pipeline] loaded boundary layers");

    let chargers = load_chargers(&config.chargers_source(), &config.encodings)?;
    info!(rows = chargers.height(), "[pipeline] loaded chargers");

    let population_source = config.population_source();
    let populations = filter_csa_populations(&read_csv_with_encodings(&population_source, &config.encodings)?)
        .with_context(|| format!("[pipeline] Failed to read CSA populations from {population_source}"))?;
    info!(rows = populations.height(), "[pipeline] loaded CSA populations");

    let acs = config.acs_sources().iter()
        .map(|source| read_csv_with_encodings(source, &config.encodings))
        .collect::<Result<Vec<_>>>()?;
    info!(extracts = acs.len(), "[pipeline] loaded ACS extracts");

    Ok(Inputs { metro, balancing_authorities, chargers, populations, acs })
}

/// Attach metro and balancing authority names to every charger row.
/// Chargers outside a layer get a null name for it.
pub fn locate_chargers(chargers: &DataFrame, metro: &BoundaryLayer, balancing_authorities: &BoundaryLayer) -> Result<DataFrame> {
    let name = LayerKind::Metro.name_field();
    ensure!(chargers.get_column_index(name).is_none(), "[pipeline] charger table already has a {name:?} column");

    let mut located = spatial_join(chargers, metro, &[name])?;
    located = spatial_join(&located, balancing_authorities, &[name])?;

    located.rename(&format!("{name}_left"), LayerKind::Metro.key_column().into())
        .context("[pipeline] metro name column missing after join")?;
    located.rename(&format!("{name}_right"), LayerKind::BalancingAuthority.key_column().into())
        .context("[pipeline] balancing authority name column missing after join")?;
    Ok(located)
}

/// Build the metro, balancing authority and city tables from loaded inputs.
pub fn process(inputs: &Inputs) -> Result<Outputs> {
    let located = locate_chargers(&inputs.chargers, &inputs.metro, &inputs.balancing_authorities)?;
    let electric = dedup_by_station(&filter_electric(&located)?)?;
    info!(rows = located.height(), electric = electric.height(), "[pipeline] located electric chargers");

    let metro = aggregate_chargers(&electric, LayerKind::Metro.key_column())?;
    let mut balancing_authorities = aggregate_chargers(&electric, LayerKind::BalancingAuthority.key_column())?;
    let mut cities = aggregate_chargers(&electric, CITY)?;
    info!(
        metro = metro.height(),
        balancing_authorities = balancing_authorities.height(),
        cities = cities.height(),
        "[pipeline] aggregated"
    );

    let metro = attach_metro_attributes(&metro, &inputs.metro)?;
    let metro = add_density_ratios(attach_population(&metro, &inputs.populations)?)?;
    let mut metro = inputs.acs.iter()
        .try_fold(metro, |metro, acs| attach_acs(&metro, acs))?;

    // joins do not keep row order
    metro = metro.sort(
        [enrich::POPULATION_BASE],
        SortMultipleOptions::default().with_order_descending(true).with_nulls_last(true),
    )?;
    info!(rows = metro.height(), columns = metro.width(), "[pipeline] enriched metro table");

    for df in [&mut metro, &mut balancing_authorities, &mut cities] {
        normalize_columns(df)?;
    }

    Ok(Outputs { metro, balancing_authorities, cities })
}

/// Write every table into the configured output directory.
pub fn write_outputs(config: &PipelineConfig, outputs: &mut Outputs) -> Result<()> {
    let dir = config.output_dir();
    common::ensure_dir_exists(&dir)?;

    for (name, df) in [
        (METRO_OUTPUT, &mut outputs.metro),
        (BALANCING_AUTHORITY_OUTPUT, &mut outputs.balancing_authorities),
        (CITY_OUTPUT, &mut outputs.cities),
    ] {
        let path = dir.join(name);
        write_csv(df, &path)?;
        info!(rows = df.height(), "[pipeline] wrote {}", path.display());
    }

    warn!("[pipeline] {METRO_OVERTIME_OUTPUT} is not produced: no charger open-date series is built");
    Ok(())
}

/// Load, process and write, returning the written tables.
pub fn run(config: &PipelineConfig) -> Result<Outputs> {
    let inputs = load_inputs(config)?;
    let mut outputs = process(&inputs)?;
    write_outputs(config, &mut outputs)?;
    Ok(outputs)
}
