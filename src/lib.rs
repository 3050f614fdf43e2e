#![doc = "EV charger density: spatial joins and per-area charger tables"]
mod aggregate;
mod chargers;
mod columns;
mod common;
mod enrich;
mod geom;
mod io;
mod join;
mod layer;

pub mod config;
pub mod pipeline;

#[doc(inline)]
pub use aggregate::{aggregate, aggregate_chargers, with_total, Metric, COUNT, TESLA_COUNT, TOTAL};

#[doc(inline)]
pub use chargers::{dedup_by_station, filter_electric, load_chargers};

#[doc(inline)]
pub use columns::{normalize_column_name, normalize_columns};

#[doc(inline)]
pub use config::PipelineConfig;

#[doc(inline)]
pub use enrich::{add_density_ratios, attach_acs, attach_metro_attributes, attach_population, filter_csa_populations};

#[doc(inline)]
pub use io::{read_csv_with_encodings, write_csv, CsvReadError, CsvSource};

#[doc(inline)]
pub use join::spatial_join;

#[doc(inline)]
pub use layer::{BoundaryLayer, LayerKind};
