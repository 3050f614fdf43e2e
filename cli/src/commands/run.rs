use anyhow::Result;
use tracing::info;

use super::load_config;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::RunArgs) -> Result<()> {
    let config = load_config(args)?;
    info!(data_folder = %config.data_folder.display(), "[run] starting");

    let outputs = evdensity::pipeline::run(&config)?;
    info!(
        metro = outputs.metro.height(),
        balancing_authorities = outputs.balancing_authorities.height(),
        cities = outputs.cities.height(),
        "[run] wrote tables to {}", config.output_dir().display()
    );

    Ok(())
}
