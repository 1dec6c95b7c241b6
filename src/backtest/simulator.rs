use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::Bar;
use crate::error::SimulatorError;

/// Absolute-price exit distances, constant for one simulation run.
/// Both must be positive; see `PipCostConfig` for the pip conversion.
#[derive(Debug, Clone, Copy)]
pub struct CostModel {
    pub take_profit: f64,
    pub stop_loss: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    EndOfData,
}

/// A completed round trip. Trades come out in increasing `entry_index`
/// order and never overlap: `trades[k].exit_index < trades[k+1].entry_index`.
#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
}

/// Which exit fills when a single bar's range touches both levels.
///
/// OHLC bars cannot say which level was hit first intrabar, so the choice is
/// a policy, not an inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiePolicy {
    StopLossFirst,
    TakeProfitFirst,
}

/// Conservative default: the adverse move is assumed to resolve first.
pub const DEFAULT_TIE_POLICY: TiePolicy = TiePolicy::StopLossFirst;

#[derive(Debug, Clone)]
pub struct Simulation {
    /// Aligned 1:1 with the input bars; true where a position closed.
    pub exit_flags: Vec<bool>,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone, Copy)]
enum PositionState {
    Flat,
    Open(OpenPosition),
}

#[derive(Debug, Clone, Copy)]
struct OpenPosition {
    entry_index: usize,
    entry_price: f64,
    tp_level: f64,
    sl_level: f64,
}

/// Walk the bar series with the entry signal and a fixed cost model,
/// producing the exit-flag series and the trade ledger.
///
/// One position at most is open at any time; an entry signal while a
/// position is open is ignored. A position still open when the data ends is
/// closed at the last bar's close with `ExitReason::EndOfData` (and the
/// last exit flag set) rather than silently dropped.
///
/// Exits fill at the touched level, not the bar close; spread and slippage
/// are already netted into the distances by the pip conversion, so filling
/// at the level does not double-count friction.
pub fn simulate(
    bars: &[Bar],
    entries: &[bool],
    cost: CostModel,
) -> Result<Simulation, SimulatorError> {
    simulate_with_policy(bars, entries, cost, DEFAULT_TIE_POLICY)
}

/// Like `simulate`, with an explicit same-bar tie-break policy.
pub fn simulate_with_policy(
    bars: &[Bar],
    entries: &[bool],
    cost: CostModel,
    tie_policy: TiePolicy,
) -> Result<Simulation, SimulatorError> {
    validate(bars, entries, cost)?;

    let mut exit_flags = vec![false; bars.len()];
    let mut trades: Vec<Trade> = Vec::new();
    let mut state = PositionState::Flat;

    // Index 0 is never evaluated for entry: every signal source looks back
    // at least one bar.
    for i in 1..bars.len() {
        state = match state {
            PositionState::Flat if entries[i] => {
                let entry_price = bars[i].close;
                PositionState::Open(OpenPosition {
                    entry_index: i,
                    entry_price,
                    tp_level: entry_price + cost.take_profit,
                    sl_level: entry_price - cost.stop_loss,
                })
            }
            PositionState::Flat => PositionState::Flat,
            PositionState::Open(pos) => match exit_reason_for_bar(&bars[i], &pos, tie_policy) {
                Some(reason) => {
                    exit_flags[i] = true;
                    trades.push(close_trade(&pos, bars, i, reason));
                    PositionState::Flat
                }
                None => PositionState::Open(pos),
            },
        };
    }

    // A run that ends while still open closes the position at the last
    // close instead of dropping it.
    if let PositionState::Open(pos) = state {
        let last = bars.len() - 1;
        exit_flags[last] = true;
        trades.push(close_trade(&pos, bars, last, ExitReason::EndOfData));
    }

    Ok(Simulation { exit_flags, trades })
}

fn validate(bars: &[Bar], entries: &[bool], cost: CostModel) -> Result<(), SimulatorError> {
    if bars.is_empty() {
        return Err(SimulatorError::NoBars);
    }
    if bars.len() != entries.len() {
        return Err(SimulatorError::LengthMismatch {
            bars: bars.len(),
            entries: entries.len(),
        });
    }
    if cost.take_profit <= 0.0 {
        return Err(SimulatorError::NonPositiveDistance {
            side: "take-profit",
            value: cost.take_profit,
        });
    }
    if cost.stop_loss <= 0.0 {
        return Err(SimulatorError::NonPositiveDistance {
            side: "stop-loss",
            value: cost.stop_loss,
        });
    }
    for i in 1..bars.len() {
        if bars[i].ts <= bars[i - 1].ts {
            return Err(SimulatorError::NonMonotonicTimestamps { index: i });
        }
    }
    Ok(())
}

fn exit_reason_for_bar(bar: &Bar, pos: &OpenPosition, tie_policy: TiePolicy) -> Option<ExitReason> {
    let tp_touched = bar.high >= pos.tp_level;
    let sl_touched = bar.low <= pos.sl_level;

    match (tp_touched, sl_touched) {
        (false, false) => None,
        (true, false) => Some(ExitReason::TakeProfit),
        (false, true) => Some(ExitReason::StopLoss),
        (true, true) => Some(match tie_policy {
            TiePolicy::StopLossFirst => ExitReason::StopLoss,
            TiePolicy::TakeProfitFirst => ExitReason::TakeProfit,
        }),
    }
}

fn close_trade(pos: &OpenPosition, bars: &[Bar], exit_index: usize, reason: ExitReason) -> Trade {
    let exit_price = match reason {
        ExitReason::TakeProfit => pos.tp_level,
        ExitReason::StopLoss => pos.sl_level,
        ExitReason::EndOfData => bars[exit_index].close,
    };

    Trade {
        entry_index: pos.entry_index,
        exit_index,
        entry_time: bars[pos.entry_index].ts,
        exit_time: bars[exit_index].ts,
        entry_price: pos.entry_price,
        exit_price,
        exit_reason: reason,
    }
}
