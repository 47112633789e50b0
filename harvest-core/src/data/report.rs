//! Diagnostics emitted by the collector and the sinks that receive them.
//!
//! The collector never prints directly; it hands every message to an injected
//! [`Reporter`]. The CLI wires in [`StdoutReporter`] or [`TracingReporter`],
//! tests use [`MemoryReporter`].

use crate::domain::{Interval, Period};
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

/// How loud a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single collector message.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Provider answered but the window holds no rows.
    NoData {
        symbol: String,
        period: Period,
        interval: Interval,
    },
    /// Provider call failed; `error` is the original error text.
    FetchFailed {
        symbol: String,
        period: Period,
        interval: Interval,
        error: String,
    },
    NothingToDisplay,
    /// Header line plus the rendered head of the table.
    Preview {
        symbol: String,
        period: Period,
        interval: Interval,
        rows: usize,
        body: String,
    },
    NothingToSave,
    CreatedDirectory {
        dir: PathBuf,
    },
    DirectoryCreationFailed {
        dir: PathBuf,
        error: String,
    },
    Saved {
        path: PathBuf,
    },
    SaveFailed {
        path: PathBuf,
        error: String,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::NoData { .. } | Diagnostic::NothingToDisplay | Diagnostic::NothingToSave => {
                Severity::Warning
            }
            Diagnostic::FetchFailed { .. }
            | Diagnostic::DirectoryCreationFailed { .. }
            | Diagnostic::SaveFailed { .. } => Severity::Error,
            Diagnostic::Preview { .. } | Diagnostic::CreatedDirectory { .. } | Diagnostic::Saved { .. } => {
                Severity::Info
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NoData {
                symbol,
                period,
                interval,
            } => write!(
                f,
                "Warning: No data returned for symbol {symbol} with period {period} and interval {interval}. \
                 This could be due to an invalid symbol, delisted stock, or no data for the requested period/interval."
            ),
            Diagnostic::FetchFailed {
                symbol,
                period,
                interval,
                error,
            } => write!(
                f,
                "An error occurred while trying to fetch data for {symbol} \
                 (Period: {period}, Interval: {interval}): {error}"
            ),
            Diagnostic::NothingToDisplay => {
                f.write_str("Empty table provided. Nothing to display.")
            }
            Diagnostic::Preview {
                symbol,
                period,
                interval,
                body,
                ..
            } => write!(
                f,
                "Displaying data for {symbol} (Period: {period}, Interval: {interval}):\n{body}"
            ),
            Diagnostic::NothingToSave => f.write_str("Empty table provided. Nothing to save."),
            Diagnostic::CreatedDirectory { dir } => {
                write!(f, "Created directory: {}", dir.display())
            }
            Diagnostic::DirectoryCreationFailed { dir, error } => {
                write!(f, "Error creating directory {}: {error}", dir.display())
            }
            Diagnostic::Saved { path } => write!(f, "Data saved to {}", path.display()),
            Diagnostic::SaveFailed { path, error } => {
                write!(f, "Error saving data to CSV {}: {error}", path.display())
            }
        }
    }
}

/// Sink for collector diagnostics.
pub trait Reporter: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Prints every diagnostic to stdout, one block per message.
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        println!("{diagnostic}");
    }
}

/// Forwards diagnostics to `tracing` at a level matching their severity.
///
/// Previews are rendered on stdout since they are output, not log lines.
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        if let Diagnostic::Preview { .. } = diagnostic {
            println!("{diagnostic}");
            return;
        }
        match diagnostic.severity() {
            Severity::Info => tracing::info!("{diagnostic}"),
            Severity::Warning => tracing::warn!("{diagnostic}"),
            Severity::Error => tracing::error!("{diagnostic}"),
        }
    }
}

/// Records diagnostics in memory.
#[derive(Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far, in order.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Rendered messages, in order.
    pub fn messages(&self) -> Vec<String> {
        self.entries().iter().map(ToString::to_string).collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(diagnostic.clone());
        }
    }
}

impl<R: Reporter + ?Sized> Reporter for std::sync::Arc<R> {
    fn report(&self, diagnostic: &Diagnostic) {
        (**self).report(diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_message_names_request() {
        let d = Diagnostic::NoData {
            symbol: "TESTSYM".into(),
            period: Period::FiveDays,
            interval: Interval::OneHour,
        };
        let msg = d.to_string();
        assert!(msg.starts_with("Warning: No data returned for symbol TESTSYM with period 5d and interval 1h."));
        assert_eq!(d.severity(), Severity::Warning);
    }

    #[test]
    fn fetch_failed_keeps_error_text() {
        let d = Diagnostic::FetchFailed {
            symbol: "TESTSYM".into(),
            period: Period::FiveDays,
            interval: Interval::OneHour,
            error: "API Network Error".into(),
        };
        assert_eq!(
            d.to_string(),
            "An error occurred while trying to fetch data for TESTSYM (Period: 5d, Interval: 1h): API Network Error"
        );
        assert_eq!(d.severity(), Severity::Error);
    }

    #[test]
    fn memory_reporter_records_in_order() {
        let reporter = MemoryReporter::new();
        reporter.report(&Diagnostic::NothingToDisplay);
        reporter.report(&Diagnostic::NothingToSave);
        assert_eq!(
            reporter.entries(),
            vec![Diagnostic::NothingToDisplay, Diagnostic::NothingToSave]
        );
        assert_eq!(reporter.messages()[1], "Empty table provided. Nothing to save.");
    }
}
