//! Bar and TimeSeriesTable: the fetched market data.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// OHLCV bar for one symbol at one timestamp.
///
/// The timestamp keeps the exchange's UTC offset so persisted files show
/// local trading times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Ordered sequence of bars. An empty table is a valid "no data" value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesTable {
    bars: Vec<Bar>,
}

/// Column names used for display and CSV headers. The first column is the index.
pub const COLUMNS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

impl TimeSeriesTable {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// First `n` bars (fewer if the table is shorter).
    pub fn head(&self, n: usize) -> &[Bar] {
        &self.bars[..n.min(self.bars.len())]
    }

    /// Fixed-width text rendering of the first `n` bars with a header line.
    pub fn preview(&self, n: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<25} {:>12} {:>12} {:>12} {:>12} {:>12}",
            COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3], COLUMNS[4], COLUMNS[5]
        );
        for bar in self.head(n) {
            let _ = writeln!(
                out,
                "{:<25} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12}",
                bar.timestamp.to_rfc3339(),
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume
            );
        }
        if self.len() > n {
            let _ = writeln!(out, "... ({} more rows)", self.len() - n);
        }
        out
    }
}

impl From<Vec<Bar>> for TimeSeriesTable {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}

impl FromIterator<Bar> for TimeSeriesTable {
    fn from_iter<I: IntoIterator<Item = Bar>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
