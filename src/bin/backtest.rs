use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use grid_backtest::backtest::{NdjsonLogger, SimulationStats, TradeLogger, simulate};
use grid_backtest::costs::{DEFAULT_PIP_SIZE, PipCostConfig};
use grid_backtest::data::{get_bars_from_input_file, get_entries_from_input_file};
use grid_backtest::output::print_summary;

/// Run one TP/SL simulation over a bar series and an entry-signal series.
#[derive(Debug, Parser)]
struct Args {
    /// Path to the OHLCV bar CSV (timestamp,open,high,low,close,volume)
    #[arg(long)]
    bars: PathBuf,

    /// Path to the entry-signal CSV (timestamp,entry with entry 0/1)
    #[arg(long)]
    entries: PathBuf,

    /// Take-profit distance in pips
    #[arg(long)]
    take_profit_pips: f64,

    /// Stop-loss distance in pips
    #[arg(long)]
    stop_loss_pips: f64,

    /// Modeled spread in pips, netted out of both distances
    #[arg(long, default_value_t = 0.0)]
    spread_pips: f64,

    /// Modeled slippage in pips, netted out of both distances
    #[arg(long, default_value_t = 0.0)]
    slippage_pips: f64,

    /// Price value of one pip
    #[arg(long, default_value_t = DEFAULT_PIP_SIZE)]
    pip_size: f64,

    /// Append closed trades to this NDJSON ledger file
    #[arg(long)]
    ledger: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let bars = get_bars_from_input_file(&args.bars)
        .with_context(|| format!("failed to load bars from {:?}", args.bars))?;
    let entries = get_entries_from_input_file(&args.entries)
        .with_context(|| format!("failed to load entries from {:?}", args.entries))?;

    println!("Loaded {} bars, {} entry flags.", bars.len(), entries.len());

    let cost = PipCostConfig {
        take_profit_pips: args.take_profit_pips,
        stop_loss_pips: args.stop_loss_pips,
        spread_pips: args.spread_pips,
        slippage_pips: args.slippage_pips,
        pip_size: args.pip_size,
    }
    .to_cost_model()?;

    let sim = simulate(&bars, &entries, cost)?;

    if let Some(path) = args.ledger {
        let logger = NdjsonLogger::new(path);
        for trade in &sim.trades {
            logger
                .log(trade)
                .map_err(|err| anyhow::anyhow!("failed to write ledger: {err}"))?;
        }
    }

    let stats = SimulationStats::from_trades(&sim.trades);
    print_summary(&stats);

    Ok(())
}
