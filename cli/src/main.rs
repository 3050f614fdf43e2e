mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{config, run};

/// Install a stderr subscriber whose level follows `-v` (warn, info, debug, trace).
fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    match &cli.command {
        Commands::Run(args) => run::run(&cli, args),
        Commands::Config(args) => config::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
