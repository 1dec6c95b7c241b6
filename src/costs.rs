use serde::Deserialize;

use crate::backtest::CostModel;
use crate::error::CostError;

pub const DEFAULT_PIP_SIZE: f64 = 0.0001;

/// Pip-denominated cost configuration, as it arrives from a config file.
///
/// The simulator works in absolute price units; `to_cost_model` performs the
/// conversion, netting modeled spread and slippage out of each raw distance:
/// `effective = (raw_pips - spread_pips - slippage_pips) * pip_size`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PipCostConfig {
    pub take_profit_pips: f64,
    pub stop_loss_pips: f64,
    #[serde(default)]
    pub spread_pips: f64,
    #[serde(default)]
    pub slippage_pips: f64,
    #[serde(default = "default_pip_size")]
    pub pip_size: f64,
}

fn default_pip_size() -> f64 {
    DEFAULT_PIP_SIZE
}

impl PipCostConfig {
    /// Convert to absolute price distances, rejecting any side that nets to
    /// zero or below. A configuration like tp=2 pips with 3 pips of spread
    /// is a setup error, not something to clamp.
    pub fn to_cost_model(&self) -> Result<CostModel, CostError> {
        if self.pip_size <= 0.0 {
            return Err(CostError::NonPositivePipSize(self.pip_size));
        }

        let take_profit = self.effective_distance(self.take_profit_pips);
        if take_profit <= 0.0 {
            return Err(CostError::NonPositiveEffectiveDistance {
                side: "take-profit",
                net: take_profit,
            });
        }

        let stop_loss = self.effective_distance(self.stop_loss_pips);
        if stop_loss <= 0.0 {
            return Err(CostError::NonPositiveEffectiveDistance {
                side: "stop-loss",
                net: stop_loss,
            });
        }

        Ok(CostModel {
            take_profit,
            stop_loss,
        })
    }

    fn effective_distance(&self, raw_pips: f64) -> f64 {
        (raw_pips - self.spread_pips - self.slippage_pips) * self.pip_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CostError;

    fn config(tp: f64, sl: f64, spread: f64, slippage: f64) -> PipCostConfig {
        PipCostConfig {
            take_profit_pips: tp,
            stop_loss_pips: sl,
            spread_pips: spread,
            slippage_pips: slippage,
            pip_size: DEFAULT_PIP_SIZE,
        }
    }

    #[test]
    fn test_to_cost_model_converts_pips_to_price_units() {
        // 50 pips * 0.0001 = 0.0050, 25 pips * 0.0001 = 0.0025
        let cost = config(50.0, 25.0, 0.0, 0.0).to_cost_model().unwrap();
        assert!((cost.take_profit - 0.0050).abs() < 1e-12);
        assert!((cost.stop_loss - 0.0025).abs() < 1e-12);
    }

    #[test]
    fn test_to_cost_model_nets_spread_and_slippage_out_of_both_sides() {
        // (50 - 2 - 1) * 0.0001 = 0.0047, (25 - 2 - 1) * 0.0001 = 0.0022
        let cost = config(50.0, 25.0, 2.0, 1.0).to_cost_model().unwrap();
        assert!((cost.take_profit - 0.0047).abs() < 1e-12);
        assert!((cost.stop_loss - 0.0022).abs() < 1e-12);
    }

    #[test]
    fn test_to_cost_model_rejects_take_profit_netting_to_zero_or_below() {
        // 2 pips of tp minus 3 pips of spread is a configuration error
        let err = config(2.0, 25.0, 3.0, 0.0).to_cost_model().unwrap_err();
        assert!(matches!(
            err,
            CostError::NonPositiveEffectiveDistance {
                side: "take-profit",
                ..
            }
        ));
    }

    #[test]
    fn test_to_cost_model_rejects_stop_loss_netting_to_zero_or_below() {
        let err = config(50.0, 1.0, 0.5, 0.5).to_cost_model().unwrap_err();
        assert!(matches!(
            err,
            CostError::NonPositiveEffectiveDistance {
                side: "stop-loss",
                ..
            }
        ));
    }

    #[test]
    fn test_to_cost_model_rejects_non_positive_pip_size() {
        let mut cfg = config(50.0, 25.0, 0.0, 0.0);
        cfg.pip_size = 0.0;
        assert_eq!(
            cfg.to_cost_model().unwrap_err(),
            CostError::NonPositivePipSize(0.0)
        );
    }
}
