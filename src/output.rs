use crate::backtest::SimulationStats;

/// Simple CLI-style summary you can reuse in a binary.
pub fn print_summary(stats: &SimulationStats) {
    println!("=== Backtest Summary ===");
    println!("Trades:            {}", stats.trades);
    println!("Take-profit exits: {}", stats.take_profit_exits);
    println!("Stop-loss exits:   {}", stats.stop_loss_exits);
    println!("End-of-data exits: {}", stats.end_of_data_exits);
    println!("Win rate:          {:.2}%", stats.win_rate * 100.0);
    println!("Total return:      {:.5}", stats.total_return);
}
