//! CSV store: file naming, serialization, and reading persisted tables back.
//!
//! Layout: `{storage_dir}/{prefix}_{SYMBOL}_{period}_{interval}[_{suffix}].csv`
//!
//! - Header row `Date,Open,High,Low,Close,Volume`, timestamp index first
//! - Timestamps in RFC 3339 with the exchange offset
//! - Floats in shortest round-trip form, so reading a file back is lossless
//! - Writes are atomic: write to `.tmp`, then rename into place

use crate::domain::bar::COLUMNS;
use crate::domain::{Bar, TimeSeriesRequest, TimeSeriesTable};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Storage directory used when none is configured.
pub const DEFAULT_STORAGE_DIR: &str = "data";

/// Prefix used when the caller does not pass one.
pub const DEFAULT_PREFIX: &str = "stock_data";

/// How artifact file names are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileNaming {
    /// Same parameters, same path; later saves overwrite earlier ones.
    #[default]
    Deterministic,
    /// Appends the local save time, keeping one file per save.
    Timestamped,
    /// Appends a short BLAKE3 digest of the CSV bytes; identical tables share a file.
    ContentHash,
}

impl FileNaming {
    pub fn as_str(self) -> &'static str {
        match self {
            FileNaming::Deterministic => "deterministic",
            FileNaming::Timestamped => "timestamped",
            FileNaming::ContentHash => "content_hash",
        }
    }
}

impl fmt::Display for FileNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileNaming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "deterministic" => Ok(FileNaming::Deterministic),
            "timestamped" => Ok(FileNaming::Timestamped),
            "content_hash" | "content-hash" => Ok(FileNaming::ContentHash),
            other => Err(format!(
                "unknown naming mode '{other}'. Valid: deterministic, timestamped, content_hash"
            )),
        }
    }
}

/// Why a table was not persisted.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("empty table, nothing to save")]
    EmptyTable,

    #[error("failed to create directory {}: {source}", dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Errors reading a persisted CSV back.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid timestamp '{value}' on row {row}: {reason}")]
    InvalidTimestamp {
        row: usize,
        value: String,
        reason: String,
    },
}

/// Shared stem of every naming mode: `{prefix}_{SYMBOL}_{period}_{interval}`.
pub fn file_stem(prefix: &str, request: &TimeSeriesRequest) -> String {
    format!(
        "{prefix}_{}_{}_{}",
        request.symbol(),
        request.period(),
        request.interval()
    )
}

/// File name for a save. `csv_bytes` feeds the content hash, `now` the timestamp.
pub fn file_name(
    naming: FileNaming,
    prefix: &str,
    request: &TimeSeriesRequest,
    csv_bytes: &[u8],
    now: NaiveDateTime,
) -> String {
    let stem = file_stem(prefix, request);
    match naming {
        FileNaming::Deterministic => format!("{stem}.csv"),
        FileNaming::Timestamped => format!("{stem}_{}.csv", now.format("%Y%m%dT%H%M%S")),
        FileNaming::ContentHash => {
            let digest = blake3::hash(csv_bytes).to_hex();
            format!("{stem}_{}.csv", &digest.as_str()[..12])
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: u64,
}

/// Serialize a table to CSV bytes, header included.
pub fn encode_csv(table: &TimeSeriesTable) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(COLUMNS)?;

    for bar in table.bars() {
        wtr.write_record([
            bar.timestamp.to_rfc3339(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }

    wtr.into_inner()
        .map_err(|e| csv::Error::from(io::Error::other(e.to_string())))
}

/// Write CSV bytes to `path` through a temporary sibling file.
/// The temporary file is removed if either step fails.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension("csv.tmp");
    fs::write(&tmp_path, bytes)
        .and_then(|()| fs::rename(&tmp_path, path))
        .map_err(|e| {
            if tmp_path.is_file() {
                let _ = fs::remove_file(&tmp_path);
            }
            e
        })
}

/// Read a persisted CSV back into a table.
pub fn load_csv(path: &Path) -> Result<TimeSeriesTable, StoreError> {
    let read_err = |source: csv::Error| StoreError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(read_err)?;

    let mut bars = Vec::new();
    for (i, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.map_err(read_err)?;
        let timestamp = DateTime::parse_from_rfc3339(row.date.trim()).map_err(|e| {
            StoreError::InvalidTimestamp {
                row: i + 1,
                value: row.date.clone(),
                reason: e.to_string(),
            }
        })?;
        bars.push(Bar {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    Ok(TimeSeriesTable::new(bars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Interval, Period};
    use chrono::NaiveDate;

    fn request() -> TimeSeriesRequest {
        TimeSeriesRequest::new("aapl", Period::OneMonth, Interval::OneDay).unwrap()
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(12, 0, 7)
            .unwrap()
    }

    fn sample() -> TimeSeriesTable {
        TimeSeriesTable::new(vec![Bar {
            timestamp: DateTime::parse_from_rfc3339("2024-01-02T00:00:00-05:00").unwrap(),
            open: 187.15,
            high: 188.44,
            low: 183.885,
            close: 185.64,
            volume: 82_488_700,
        }])
    }

    #[test]
    fn deterministic_name() {
        let name = file_name(FileNaming::Deterministic, "demo", &request(), b"", noon());
        assert_eq!(name, "demo_AAPL_1mo_1d.csv");
    }

    #[test]
    fn timestamped_name() {
        let name = file_name(FileNaming::Timestamped, "demo", &request(), b"", noon());
        assert_eq!(name, "demo_AAPL_1mo_1d_20240305T120007.csv");
    }

    #[test]
    fn content_hash_name_tracks_bytes() {
        let a = file_name(FileNaming::ContentHash, "demo", &request(), b"one", noon());
        let b = file_name(FileNaming::ContentHash, "demo", &request(), b"two", noon());
        let a2 = file_name(FileNaming::ContentHash, "demo", &request(), b"one", noon());
        assert_ne!(a, b);
        assert_eq!(a, a2);
        assert!(a.starts_with("demo_AAPL_1mo_1d_"));
        assert_eq!(a.len(), "demo_AAPL_1mo_1d_".len() + 12 + ".csv".len());
    }

    #[test]
    fn encoded_csv_layout() {
        let bytes = encode_csv(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,Open,High,Low,Close,Volume"));
        assert_eq!(
            lines.next(),
            Some("2024-01-02T00:00:00-05:00,187.15,188.44,183.885,185.64,82488700")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn naming_mode_parses() {
        assert_eq!("timestamped".parse::<FileNaming>(), Ok(FileNaming::Timestamped));
        assert_eq!("content-hash".parse::<FileNaming>(), Ok(FileNaming::ContentHash));
        assert!("random".parse::<FileNaming>().is_err());
    }

    #[test]
    fn load_rejects_bad_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Date,Open,High,Low,Close,Volume\nyesterday,1,2,0.5,1.5,10\n").unwrap();

        match load_csv(&path) {
            Err(StoreError::InvalidTimestamp { row, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected InvalidTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn failed_temp_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        assert!(write_atomic(&path, b"x").is_err());
        assert!(!path.exists());
        assert!(!path.with_extension("csv.tmp").exists());
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::create_dir_all(path.join("occupied")).unwrap();

        assert!(write_atomic(&path, b"x").is_err());
        assert!(path.is_dir());
        assert!(!dir.path().join("out.csv.tmp").exists());
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_atomic(&path, b"x").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"x");
        assert!(!dir.path().join("out.csv.tmp").exists());
    }
}
