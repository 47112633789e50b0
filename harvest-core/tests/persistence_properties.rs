//! Property tests for CSV persistence.
//!
//! Uses proptest to verify:
//! 1. Round trip: persist then load yields an equal table
//! 2. Deterministic naming: same parameters, same path
//! 3. Case normalization: `msft` and `MSFT` share a file name
//! 4. Content-hash naming depends only on the CSV bytes

use chrono::{DateTime, FixedOffset, TimeZone};
use harvest_core::data::{load_csv, FileNaming, HistoryProvider, DataError, TimeSeriesCollector};
use harvest_core::data::store::{encode_csv, file_name};
use harvest_core::domain::{Bar, Interval, Period, TimeSeriesRequest, TimeSeriesTable};
use proptest::prelude::*;
use std::sync::Arc;

/// Provider that is never called; these tests only exercise persistence.
struct Unused;

impl HistoryProvider for Unused {
    fn name(&self) -> &str {
        "unused"
    }

    fn fetch_history(&self, _request: &TimeSeriesRequest) -> Result<TimeSeriesTable, DataError> {
        Err(DataError::Other("not used in persistence tests".into()))
    }
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_period() -> impl Strategy<Value = Period> {
    prop::sample::select(Period::ALL.to_vec())
}

fn arb_interval() -> impl Strategy<Value = Interval> {
    prop::sample::select(Interval::ALL.to_vec())
}

fn arb_price() -> impl Strategy<Value = f64> {
    0.0001..100_000.0_f64
}

fn arb_timestamp() -> impl Strategy<Value = DateTime<FixedOffset>> {
    // 2000-01-01 .. 2035-01-01, offsets from UTC-12 to UTC+14 in quarter hours
    (946_684_800i64..2_051_222_400, -48i32..=56).prop_map(|(secs, quarters)| {
        let offset = FixedOffset::east_opt(quarters * 900).unwrap();
        offset.timestamp_opt(secs, 0).unwrap()
    })
}

fn arb_bar() -> impl Strategy<Value = Bar> {
    (
        arb_timestamp(),
        arb_price(),
        arb_price(),
        arb_price(),
        arb_price(),
        any::<u64>(),
    )
        .prop_map(|(timestamp, open, high, low, close, volume)| Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
}

fn arb_table() -> impl Strategy<Value = TimeSeriesTable> {
    prop::collection::vec(arb_bar(), 1..40).prop_map(TimeSeriesTable::new)
}

fn arb_symbol() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,5}(\\.[A-Za-z]{1,2})?"
}

fn arb_prefix() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever is saved is exactly what is read back.
    #[test]
    fn persist_then_load_is_lossless(table in arb_table(), symbol in arb_symbol()) {
        let dir = tempfile::tempdir().unwrap();
        let request = TimeSeriesRequest::new(&symbol, Period::OneYear, Interval::OneDay).unwrap();
        let collector = TimeSeriesCollector::new(request, Unused)
            .with_reporter(Arc::new(harvest_core::data::MemoryReporter::new()))
            .with_storage_dir(dir.path().join("data"));

        let saved = collector.try_persist(&table, "prop").unwrap();
        let loaded = load_csv(&saved.path).unwrap();
        prop_assert_eq!(loaded, table);
    }

    /// The deterministic path depends only on (prefix, symbol, period, interval).
    #[test]
    fn deterministic_path_is_stable(
        prefix in arb_prefix(),
        symbol in arb_symbol(),
        period in arb_period(),
        interval in arb_interval(),
    ) {
        let a = TimeSeriesCollector::new(
            TimeSeriesRequest::new(&symbol, period, interval).unwrap(),
            Unused,
        );
        let b = TimeSeriesCollector::new(
            TimeSeriesRequest::new(&symbol, period, interval).unwrap(),
            Unused,
        );
        prop_assert_eq!(a.artifact_path(&prefix), b.artifact_path(&prefix));

        let expected = format!(
            "{prefix}_{}_{}_{}.csv",
            symbol.to_uppercase(),
            period.as_str(),
            interval.as_str()
        );
        let actual = a.artifact_path(&prefix);
        prop_assert_eq!(actual.file_name().unwrap().to_string_lossy().into_owned(), expected);
    }

    /// Symbol spelling does not change the file name.
    #[test]
    fn symbol_case_is_normalized(symbol in arb_symbol(), prefix in arb_prefix()) {
        let lower = TimeSeriesRequest::new(&symbol.to_lowercase(), Period::OneMonth, Interval::OneDay).unwrap();
        let upper = TimeSeriesRequest::new(&symbol.to_uppercase(), Period::OneMonth, Interval::OneDay).unwrap();
        let now = chrono::Local::now().naive_local();

        prop_assert_eq!(
            file_name(FileNaming::Deterministic, &prefix, &lower, b"", now),
            file_name(FileNaming::Deterministic, &prefix, &upper, b"", now)
        );
    }

    /// Equal tables hash to the same content-addressed name, at any time.
    #[test]
    fn content_hash_ignores_clock(table in arb_table(), later_secs in 1i64..10_000_000) {
        let request = TimeSeriesRequest::new("MSFT", Period::OneMonth, Interval::OneDay).unwrap();
        let bytes = encode_csv(&table).unwrap();
        let now = chrono::Local::now().naive_local();
        let later = now + chrono::Duration::seconds(later_secs);

        prop_assert_eq!(
            file_name(FileNaming::ContentHash, "h", &request, &bytes, now),
            file_name(FileNaming::ContentHash, "h", &request, &bytes, later)
        );
    }
}

#[test]
fn empty_table_never_touches_disk() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("data");
    let collector = TimeSeriesCollector::new(
        TimeSeriesRequest::new("AAPL", Period::OneMonth, Interval::OneDay).unwrap(),
        Unused,
    )
    .with_reporter(Arc::new(harvest_core::data::MemoryReporter::new()))
    .with_storage_dir(&storage);

    assert!(collector.try_persist(&TimeSeriesTable::empty(), "x").is_err());
    assert!(!storage.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn timestamped_saves_do_not_overwrite_across_seconds() {
    let request = TimeSeriesRequest::new("AAPL", Period::OneMonth, Interval::OneDay).unwrap();
    let t0 = chrono::NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let t1 = t0 + chrono::Duration::seconds(1);

    let a = file_name(FileNaming::Timestamped, "demo", &request, b"", t0);
    let b = file_name(FileNaming::Timestamped, "demo", &request, b"", t1);
    assert_ne!(a, b);
    assert_eq!(a, "demo_AAPL_1mo_1d_20240603T093000.csv");
}
