use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use town_gen::Config;
use town_gen::flush::flush_to_jsonl;
use town_gen::sim::generate_world;

#[derive(Parser)]
#[command(name = "towngen", about = "Generate a small American town and its people")]
struct Cli {
    /// Path to a TOML config; built-in defaults are used for anything it omits
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the random number generator
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Directory the snapshot is written to as JSONL
    #[arg(long, default_value = "./town")]
    output: PathBuf,

    /// Override the year low-fidelity simulation stops
    #[arg(long)]
    until_year: Option<u32>,

    /// Override the number of high-fidelity days before gameplay
    #[arg(long)]
    high_fidelity_days: Option<u32>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!(config = %path.display(), "loading config");
            Config::from_file(path)?
        }
        None => Config::default(),
    };
    if let Some(year) = cli.until_year {
        config.time.year_worldgen_ends = year;
    }
    if let Some(days) = cli.high_fidelity_days {
        config.time.high_fidelity_days = days;
    }

    let sim = generate_world(config, cli.seed)?;
    let snapshot = sim.world.snapshot();
    flush_to_jsonl(&snapshot, &cli.output)?;
    tracing::info!(
        output = %cli.output.display(),
        town = %snapshot.town,
        residents = snapshot.residents.len(),
        "snapshot written"
    );
    Ok(())
}
