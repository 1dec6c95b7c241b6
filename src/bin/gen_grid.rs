use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use grid_backtest::sampler::{Combination, ParameterDimension, SampleSeed, sample, sample_seeded};

/// Sample a parameter grid under a combination budget and write the
/// combination-set artifact consumed by the per-combination runner.
#[derive(Debug, Parser)]
struct Args {
    /// config-file path
    #[arg(long)]
    config: PathBuf,

    /// Output path for the combination-set JSON
    #[arg(long)]
    out: PathBuf,
}

#[derive(Deserialize)]
struct Config {
    /// Parameter dimensions: each with a name and either an explicit
    /// `values` list or `{ min, max }` bounds
    dimensions: Vec<ParameterDimension>,

    /// Maximum number of combinations to emit
    max_combinations: usize,

    /// Seeds combination selection per entity; omit for plain even spacing
    entity_id: Option<String>,
}

#[derive(Serialize)]
struct GridArtifact {
    entity: Option<String>,
    budget: usize,
    combinations: Vec<Combination>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args
        .config
        .into_os_string()
        .into_string()
        .expect("Failed to translate config file path into string");
    let config: Config = config::Config::builder()
        .add_source(config::File::with_name(&config_path))
        .build()?
        .try_deserialize()?;

    let combinations = match &config.entity_id {
        Some(entity) => sample_seeded(
            &config.dimensions,
            config.max_combinations,
            SampleSeed::for_entity(entity),
        )?,
        None => sample(&config.dimensions, config.max_combinations)?,
    };

    println!(
        "Sampled {} combinations from {} dimensions (budget {}).",
        combinations.len(),
        config.dimensions.len(),
        config.max_combinations
    );

    let artifact = GridArtifact {
        entity: config.entity_id,
        budget: config.max_combinations,
        combinations,
    };

    let json = serde_json::to_string_pretty(&artifact)?;
    fs::write(&args.out, json).with_context(|| format!("failed to write {:?}", args.out))?;

    println!("Wrote combination set to {:?}.", args.out);

    Ok(())
}
