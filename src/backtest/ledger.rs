use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::backtest::Trade;

pub trait TradeLogger: Sync {
    fn log(&self, trade: &Trade) -> Result<(), String>;
}

/// Appends one JSON line per closed trade; the per-run ledger artifact.
pub struct NdjsonLogger {
    pub path: PathBuf,
}

impl NdjsonLogger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TradeLogger for NdjsonLogger {
    fn log(&self, trade: &Trade) -> Result<(), String> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| err.to_string())?;
        let line = serde_json::to_string(trade).map_err(|err| err.to_string())?;
        writeln!(f, "{line}").map_err(|err| err.to_string())?;
        Ok(())
    }
}

pub struct NoopLogger;

impl TradeLogger for NoopLogger {
    fn log(&self, _trade: &Trade) -> Result<(), String> {
        Ok(())
    }
}
