use std::path::PathBuf;

/// EV charger density tables by metro area, balancing authority and city
#[derive(clap::Parser, Debug)]
#[command(name = "evdensity", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Join chargers to boundary layers and write the output tables
    Run(RunArgs),

    /// Print the effective configuration as JSON (writes to stdout)
    Config(RunArgs),
}

/// Input locations. Flags override values from `--config`.
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// JSON config file; missing fields take their defaults
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Root directory of the input files, defaults to "Data"
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub data_folder: Option<PathBuf>,

    /// CSA boundary shapefile, relative to the data folder
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub metro_shapefile: Option<PathBuf>,

    /// Balancing authority shapefile, relative to the data folder
    #[arg(long = "ba-shapefile", value_hint = clap::ValueHint::FilePath)]
    pub balancing_authority_shapefile: Option<PathBuf>,

    /// CSA population table, a path or an HTTP(S) URL
    #[arg(long)]
    pub population: Option<String>,

    /// Output directory, defaults to the data folder
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,
}
