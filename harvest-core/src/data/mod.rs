//! Market history: provider, collector, CSV store, diagnostics

pub mod collector;
pub mod provider;
pub mod report;
pub mod store;
pub mod yahoo;

pub use collector::{SavedArtifact, TimeSeriesCollector, PREVIEW_ROWS};
pub use provider::{DataError, FetchOutcome, HistoryProvider};
pub use report::{Diagnostic, MemoryReporter, Reporter, Severity, StdoutReporter, TracingReporter};
pub use store::{load_csv, FileNaming, PersistError, StoreError, DEFAULT_PREFIX, DEFAULT_STORAGE_DIR};
pub use yahoo::YahooProvider;
