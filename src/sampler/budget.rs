use crate::error::SamplerError;

/// Ordered pip candidate pools the exit grid draws from when a config does
/// not supply its own.
pub const DEFAULT_TAKE_PROFIT_PIPS: [f64; 10] =
    [5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 60.0, 80.0];
pub const DEFAULT_STOP_LOSS_PIPS: [f64; 8] = [5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0];

/// (take-profit count, stop-loss count) pairs in increasing product order.
/// `exit_grid_for_budget` picks the first rung whose product meets the
/// required exit-combination count.
const EXIT_GRID_LADDER: [(usize, usize); 15] = [
    (1, 1),
    (2, 1),
    (2, 2),
    (3, 2),
    (3, 3),
    (4, 3),
    (4, 4),
    (5, 4),
    (5, 5),
    (6, 5),
    (6, 6),
    (7, 6),
    (7, 7),
    (8, 7),
    (8, 8),
];

/// How many take-profit and stop-loss values to test per entry combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitGrid {
    pub num_take_profit: usize,
    pub num_stop_loss: usize,
}

impl ExitGrid {
    pub fn product(&self) -> usize {
        self.num_take_profit * self.num_stop_loss
    }
}

/// Size the exit grid for a two-part budget: with `entry_count` entry
/// combinations already fixed, the exit product may not need to exceed
/// `target_total / entry_count`. Picks the smallest ladder rung meeting
/// that, capped at the top rung, so the final count stays close to the
/// budget and identical inputs always size identically.
pub fn exit_grid_for_budget(
    target_total: usize,
    entry_count: usize,
) -> Result<ExitGrid, SamplerError> {
    if target_total == 0 {
        return Err(SamplerError::ZeroBudget);
    }
    if entry_count == 0 {
        return Err(SamplerError::ZeroEntryCount);
    }

    let required = (target_total / entry_count).max(1);
    let (num_take_profit, num_stop_loss) = EXIT_GRID_LADDER
        .iter()
        .copied()
        .find(|(tp, sl)| tp * sl >= required)
        .unwrap_or(EXIT_GRID_LADDER[EXIT_GRID_LADDER.len() - 1]);

    Ok(ExitGrid {
        num_take_profit,
        num_stop_loss,
    })
}

/// Draw `count` values from an ordered candidate list with a fixed stride
/// (`len / count`), starting at the first candidate. Deterministic and
/// reproducible for identical inputs.
pub fn stride_subsample(candidates: &[f64], count: usize) -> Vec<f64> {
    if count == 0 || candidates.is_empty() {
        return Vec::new();
    }
    if count >= candidates.len() {
        return candidates.to_vec();
    }
    let stride = candidates.len() / count;
    (0..count).map(|i| candidates[i * stride]).collect()
}

/// Convenience for the sweep runner: size the exit grid for the budget and
/// draw the corresponding take-profit and stop-loss pip values from the
/// given candidate pools.
pub fn exit_candidates_for_budget(
    target_total: usize,
    entry_count: usize,
    tp_candidates: &[f64],
    sl_candidates: &[f64],
) -> Result<(Vec<f64>, Vec<f64>), SamplerError> {
    let grid = exit_grid_for_budget(target_total, entry_count)?;
    Ok((
        stride_subsample(tp_candidates, grid.num_take_profit),
        stride_subsample(sl_candidates, grid.num_stop_loss),
    ))
}
