mod ledger;
mod simulator;
mod stats;

pub use ledger::{NdjsonLogger, NoopLogger, TradeLogger};
pub use simulator::{
    CostModel, DEFAULT_TIE_POLICY, ExitReason, Simulation, TiePolicy, Trade, simulate,
    simulate_with_policy,
};
pub use stats::SimulationStats;
