use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Deserialize;

use grid_backtest::backtest::{SimulationStats, simulate};
use grid_backtest::costs::{DEFAULT_PIP_SIZE, PipCostConfig};
use grid_backtest::data::{Bar, get_bars_from_input_file, get_entries_from_input_file};
use grid_backtest::sampler::{
    Combination, DEFAULT_STOP_LOSS_PIPS, DEFAULT_TAKE_PROFIT_PIPS, ParameterDimension, SampleSeed,
    exit_candidates_for_budget, sample, sample_seeded,
};

/// Sweep a budget-sampled TP/SL grid over one instrument and report the
/// best combination.
#[derive(Debug, Parser)]
struct Args {
    /// config-file path
    #[arg(long)]
    config: PathBuf,
}

#[derive(Deserialize)]
struct Config {
    /// Path to the OHLCV bar CSV (timestamp,open,high,low,close,volume)
    bars: PathBuf,

    /// Path to the entry-signal CSV (timestamp,entry with entry 0/1)
    entries: PathBuf,

    /// Maximum number of combinations to test for this instrument
    max_combinations: usize,

    /// Entry-parameter combinations already fixed upstream; the exit grid
    /// is sized so entry * exit stays close to max_combinations
    #[serde(default = "default_entry_combinations")]
    entry_combinations: usize,

    /// Modeled spread in pips
    #[serde(default)]
    spread_pips: f64,

    /// Modeled slippage in pips
    #[serde(default)]
    slippage_pips: f64,

    /// Price value of one pip
    #[serde(default = "default_pip_size")]
    pip_size: f64,

    /// Ordered take-profit pip candidates (defaults used when absent)
    take_profit_pips: Option<Vec<f64>>,

    /// Ordered stop-loss pip candidates (defaults used when absent)
    stop_loss_pips: Option<Vec<f64>>,

    /// Seeds combination selection so entities sharing the same candidate
    /// pools get different grids; omit for plain even spacing
    entity_id: Option<String>,
}

fn default_entry_combinations() -> usize {
    1
}

fn default_pip_size() -> f64 {
    DEFAULT_PIP_SIZE
}

fn run_combination(
    combo: &Combination,
    bars: &[Bar],
    entries: &[bool],
    config: &Config,
) -> Result<SimulationStats, String> {
    let tp = *combo
        .get("tp_pips")
        .ok_or_else(|| "combination missing tp_pips".to_string())?;
    let sl = *combo
        .get("sl_pips")
        .ok_or_else(|| "combination missing sl_pips".to_string())?;

    let cost = PipCostConfig {
        take_profit_pips: tp,
        stop_loss_pips: sl,
        spread_pips: config.spread_pips,
        slippage_pips: config.slippage_pips,
        pip_size: config.pip_size,
    }
    .to_cost_model()
    .map_err(|err| err.to_string())?;

    let sim = simulate(bars, entries, cost).map_err(|err| err.to_string())?;
    Ok(SimulationStats::from_trades(&sim.trades))
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

    let bars = get_bars_from_input_file(&config.bars)
        .with_context(|| format!("failed to load bars from {:?}", config.bars))?;
    let entries = get_entries_from_input_file(&config.entries)
        .with_context(|| format!("failed to load entries from {:?}", config.entries))?;

    println!("Loaded {} bars, {} entry flags.", bars.len(), entries.len());

    let tp_pool = config
        .take_profit_pips
        .clone()
        .unwrap_or_else(|| DEFAULT_TAKE_PROFIT_PIPS.to_vec());
    let sl_pool = config
        .stop_loss_pips
        .clone()
        .unwrap_or_else(|| DEFAULT_STOP_LOSS_PIPS.to_vec());

    // Two-part budget: the exit grid only needs max_combinations /
    // entry_combinations cells.
    let (tp_values, sl_values) = exit_candidates_for_budget(
        config.max_combinations,
        config.entry_combinations,
        &tp_pool,
        &sl_pool,
    )?;

    let dimensions = vec![
        ParameterDimension::with_values("tp_pips", tp_values),
        ParameterDimension::with_values("sl_pips", sl_values),
    ];

    let combinations = match &config.entity_id {
        Some(entity) => sample_seeded(
            &dimensions,
            config.max_combinations,
            SampleSeed::for_entity(entity),
        )?,
        None => sample(&dimensions, config.max_combinations)?,
    };

    println!(
        "Testing {} combinations (budget {}).",
        combinations.len(),
        config.max_combinations
    );

    let results: Vec<(&Combination, Result<SimulationStats, String>)> = combinations
        .par_iter()
        .map(|combo| (combo, run_combination(combo, &bars, &entries, &config)))
        .collect();

    println!();
    println!("tp_pips  sl_pips  trades  win%    return");

    let mut best: Option<(&Combination, SimulationStats)> = None;

    for (combo, result) in results {
        match result {
            Ok(stats) => {
                println!(
                    "{:>7} {:>8} {:>7} {:6.2} {:9.5}",
                    combo["tp_pips"],
                    combo["sl_pips"],
                    stats.trades,
                    stats.win_rate * 100.0,
                    stats.total_return,
                );

                // Update "best" by:
                // 1) higher total return
                // 2) if equal (within tiny epsilon), pick higher win rate
                let is_better = match &best {
                    None => true,
                    Some((_, current)) => {
                        if stats.total_return > current.total_return + 1e-9 {
                            true
                        } else if (stats.total_return - current.total_return).abs() < 1e-9 {
                            stats.win_rate > current.win_rate
                        } else {
                            false
                        }
                    }
                };
                if is_better {
                    best = Some((combo, stats));
                }
            }
            // A malformed combination aborts only its own run.
            Err(err) => {
                eprintln!(
                    "combination tp_pips={} sl_pips={} failed: {err}",
                    combo["tp_pips"], combo["sl_pips"],
                );
            }
        }
    }

    println!();
    if let Some((combo, stats)) = best {
        println!("=== Best combination ===");
        println!("tp_pips:      {}", combo["tp_pips"]);
        println!("sl_pips:      {}", combo["sl_pips"]);
        println!("trades:       {}", stats.trades);
        println!("win rate:     {:.2}%", stats.win_rate * 100.0);
        println!("total return: {:.5}", stats.total_return);
    } else {
        println!("No valid backtest result produced.");
    }

    Ok(())
}
