use serde::Serialize;

use crate::backtest::{ExitReason, Trade};

/// Per-run summary derived from the trade ledger.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationStats {
    pub trades: usize,
    pub take_profit_exits: usize,
    pub stop_loss_exits: usize,
    pub end_of_data_exits: usize,
    /// Fraction of trades that closed above their entry price.
    pub win_rate: f64,
    /// Sum of (exit - entry) across all trades, in price units.
    pub total_return: f64,
}

impl SimulationStats {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut take_profit_exits = 0;
        let mut stop_loss_exits = 0;
        let mut end_of_data_exits = 0;
        let mut wins = 0;
        let mut total_return = 0.0;

        for trade in trades {
            match trade.exit_reason {
                ExitReason::TakeProfit => take_profit_exits += 1,
                ExitReason::StopLoss => stop_loss_exits += 1,
                ExitReason::EndOfData => end_of_data_exits += 1,
            }
            if trade.exit_price > trade.entry_price {
                wins += 1;
            }
            total_return += trade.exit_price - trade.entry_price;
        }

        let win_rate = if trades.is_empty() {
            0.0
        } else {
            wins as f64 / trades.len() as f64
        };

        Self {
            trades: trades.len(),
            take_profit_exits,
            stop_loss_exits,
            end_of_data_exits,
            win_rate,
            total_return,
        }
    }
}
