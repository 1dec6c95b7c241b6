use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct BarRow {
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One OHLCV sample for a fixed time interval.
#[derive(Debug, Clone, Serialize)]
pub struct Bar {
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Basic OHLC consistency: high is the top of the range, low the bottom.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

pub fn get_bars_from_input_file(input: &PathBuf) -> Result<Vec<Bar>> {
    let file =
        File::open(input).with_context(|| format!("failed to open input file: {:?}", input))?;
    bars_from_reader(file)
}

pub fn bars_from_reader<R: Read>(reader: R) -> Result<Vec<Bar>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut bars: Vec<Bar> = Vec::new();

    for result in rdr.deserialize::<BarRow>() {
        let row: BarRow = result.with_context(|| "failed to deserialize CSV row")?;
        let ts = DateTime::parse_from_rfc3339(&row.timestamp)
            .with_context(|| format!("failed to parse timestamp: {}", row.timestamp))?
            .with_timezone(&Utc);
        let bar = Bar {
            ts,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        };
        anyhow::ensure!(
            bar.is_sane(),
            "inconsistent OHLC values at {}",
            row.timestamp
        );
        bars.push(bar);
    }
    Ok(bars)
}

#[derive(Debug, Deserialize)]
struct EntryRow {
    #[allow(dead_code)]
    timestamp: String,
    entry: u8,
}

/// Load an entry-signal series (CSV columns: timestamp,entry with entry 0/1).
/// Alignment with the bar series is positional; the simulator rejects a
/// length mismatch.
pub fn get_entries_from_input_file(input: &PathBuf) -> Result<Vec<bool>> {
    let file =
        File::open(input).with_context(|| format!("failed to open input file: {:?}", input))?;
    entries_from_reader(file)
}

pub fn entries_from_reader<R: Read>(reader: R) -> Result<Vec<bool>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut entries: Vec<bool> = Vec::new();

    for result in rdr.deserialize::<EntryRow>() {
        let row: EntryRow = result.with_context(|| "failed to deserialize CSV row")?;
        entries.push(row.entry != 0);
    }
    Ok(entries)
}
