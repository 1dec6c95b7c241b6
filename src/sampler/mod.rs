mod budget;
mod grid;
mod seed;

pub use budget::{
    DEFAULT_STOP_LOSS_PIPS, DEFAULT_TAKE_PROFIT_PIPS, ExitGrid, exit_candidates_for_budget,
    exit_grid_for_budget, stride_subsample,
};
pub use grid::{
    Combination, DimensionValues, ParameterDimension, RANGE_SYNTH_POINTS, sample, sample_seeded,
};
pub use seed::SampleSeed;
