mod config;
mod scenario;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::SimConfig;

#[derive(Parser, Debug)]
#[command(
    name = "gait-sim",
    version,
    about = "Walk a procedural quadruped across a test course and log its footsteps"
)]
struct Opts {
    /// TOML file with optional [gait], [scenario] and [[footsteps]] tables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of simulated ticks.
    #[arg(long)]
    ticks: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();
    let mut config = SimConfig::load(opts.config.as_deref())?;
    if let Some(ticks) = opts.ticks {
        config.scenario.ticks = ticks;
    }

    scenario::run(&config)?;
    Ok(())
}
