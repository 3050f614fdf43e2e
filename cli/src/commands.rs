pub mod config;
pub mod run;

use anyhow::Result;
use evdensity::PipelineConfig;

use crate::cli::RunArgs;

/// Config file (or defaults) with command-line overrides applied.
pub(crate) fn load_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(dir) = &args.data_folder { config.data_folder = dir.clone(); }
    if let Some(path) = &args.metro_shapefile { config.metro_shapefile = path.clone(); }
    if let Some(path) = &args.balancing_authority_shapefile { config.balancing_authority_shapefile = path.clone(); }
    if let Some(source) = &args.population { config.population_source = source.as_str().into(); }
    if let Some(dir) = &args.output_dir { config.output_dir = Some(dir.clone()); }

    Ok(config)
}
