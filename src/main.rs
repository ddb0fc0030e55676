use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use timeavg::manager::Manager;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    run_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the noisy series and its hourly published values.
    Generate,

    /// Reconstruct the hourly values from the published cumulative means.
    Reconstruct,

    /// Render the tables to an SVG chart.
    Render,

    /// Compare the reconstructed values with the hourly sample means.
    Analyze,

    /// Run generation, reconstruction and rendering in one go.
    Run,

    /// Remove every generated file.
    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.run_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Generate => mgr.generate()?,
        Command::Reconstruct => mgr.reconstruct()?,
        Command::Render => mgr.render()?,
        Command::Analyze => mgr.analyze()?,
        Command::Run => mgr.run()?,
        Command::Clean => mgr.clean()?,
    }

    Ok(())
}
