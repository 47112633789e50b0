//! History provider trait and structured error types.
//!
//! The HistoryProvider trait abstracts over market-data sources so the
//! collector can be driven by Yahoo Finance in production and by canned
//! tables in tests.

use crate::domain::{TimeSeriesRequest, TimeSeriesTable};
use thiserror::Error;

/// Structured error types for provider calls.
///
/// These are designed to be displayable in both CLI output and diagnostics.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("HTTP {status} from provider")]
    HttpStatus { status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for market-data providers.
///
/// A provider returns an empty table when the request is valid but the window
/// has no rows; any failure to produce a table at all is an error.
pub trait HistoryProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the bars for `request.period()` at `request.interval()` granularity.
    fn fetch_history(&self, request: &TimeSeriesRequest) -> Result<TimeSeriesTable, DataError>;
}

impl<P: HistoryProvider + ?Sized> HistoryProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_history(&self, request: &TimeSeriesRequest) -> Result<TimeSeriesTable, DataError> {
        (**self).fetch_history(request)
    }
}

/// Outcome of a fetch, keeping "no data" and "failed" apart.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(TimeSeriesTable),
    NoData,
    Failed(DataError),
}

impl FetchOutcome {
    /// Classify a raw provider result.
    pub fn from_result(result: Result<TimeSeriesTable, DataError>) -> Self {
        match result {
            Ok(table) if table.is_empty() => FetchOutcome::NoData,
            Ok(table) => FetchOutcome::Success(table),
            Err(e) => FetchOutcome::Failed(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// Collapse to a table; both `NoData` and `Failed` become empty.
    pub fn into_table(self) -> TimeSeriesTable {
        match self {
            FetchOutcome::Success(table) => table,
            FetchOutcome::NoData | FetchOutcome::Failed(_) => TimeSeriesTable::empty(),
        }
    }
}
