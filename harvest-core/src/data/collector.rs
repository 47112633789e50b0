//! Fetch, preview, and persist one symbol's history.
//!
//! Each operation comes in two flavors:
//! - `try_fetch` / `try_persist` return typed outcomes so callers can tell
//!   "no data" from "failed" from "saved"
//! - `fetch` / `persist` collapse those outcomes into an empty table or `None`
//!   and route the reason through the reporter instead

use super::provider::{FetchOutcome, HistoryProvider};
use super::report::{Diagnostic, Reporter, StdoutReporter};
use super::store::{self, FileNaming, PersistError, DEFAULT_STORAGE_DIR};
use crate::config::CollectorConfig;
use crate::domain::{TimeSeriesRequest, TimeSeriesTable};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Rows shown by [`TimeSeriesCollector::display`].
pub const PREVIEW_ROWS: usize = 5;

/// A successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub path: PathBuf,
    /// Set when this save had to create the storage directory.
    pub created_dir: Option<PathBuf>,
}

/// Collector bound to a single request for its whole lifetime.
pub struct TimeSeriesCollector {
    request: TimeSeriesRequest,
    provider: Box<dyn HistoryProvider>,
    reporter: Arc<dyn Reporter>,
    storage_dir: PathBuf,
    naming: FileNaming,
}

impl TimeSeriesCollector {
    /// Collector writing to `./data` with deterministic names, reporting to stdout.
    pub fn new(request: TimeSeriesRequest, provider: impl HistoryProvider + 'static) -> Self {
        Self {
            request,
            provider: Box::new(provider),
            reporter: Arc::new(StdoutReporter),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            naming: FileNaming::Deterministic,
        }
    }

    /// Apply the storage settings of a config section.
    pub fn with_config(self, config: &CollectorConfig) -> Self {
        self.with_storage_dir(&config.storage_dir)
            .with_naming(config.naming)
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    pub fn with_naming(mut self, naming: FileNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Call the provider once and classify the answer.
    pub fn try_fetch(&self) -> FetchOutcome {
        tracing::debug!(
            provider = self.provider.name(),
            symbol = self.request.symbol(),
            period = %self.request.period(),
            interval = %self.request.interval(),
            "fetching history"
        );
        let outcome = FetchOutcome::from_result(self.provider.fetch_history(&self.request));
        if let FetchOutcome::Success(table) = &outcome {
            tracing::debug!(rows = table.len(), "fetched history");
        }
        outcome
    }

    /// Fetch, reporting "no data" and failures and returning an empty table for both.
    pub fn fetch(&self) -> TimeSeriesTable {
        match self.try_fetch() {
            FetchOutcome::Success(table) => table,
            FetchOutcome::NoData => {
                self.reporter.report(&Diagnostic::NoData {
                    symbol: self.request.symbol().to_string(),
                    period: self.request.period(),
                    interval: self.request.interval(),
                });
                TimeSeriesTable::empty()
            }
            FetchOutcome::Failed(err) => {
                self.reporter.report(&Diagnostic::FetchFailed {
                    symbol: self.request.symbol().to_string(),
                    period: self.request.period(),
                    interval: self.request.interval(),
                    error: err.to_string(),
                });
                TimeSeriesTable::empty()
            }
        }
    }

    /// Report a header and the first [`PREVIEW_ROWS`] rows of `table`.
    pub fn display(&self, table: &TimeSeriesTable) {
        if table.is_empty() {
            self.reporter.report(&Diagnostic::NothingToDisplay);
            return;
        }
        self.reporter.report(&Diagnostic::Preview {
            symbol: self.request.symbol().to_string(),
            period: self.request.period(),
            interval: self.request.interval(),
            rows: table.head(PREVIEW_ROWS).len(),
            body: table.preview(PREVIEW_ROWS),
        });
    }

    /// Path a deterministic save with `prefix` writes to. Touches nothing.
    pub fn artifact_path(&self, prefix: &str) -> PathBuf {
        self.storage_dir
            .join(format!("{}.csv", store::file_stem(prefix, &self.request)))
    }

    /// Save `table` as CSV under the storage directory.
    pub fn try_persist(
        &self,
        table: &TimeSeriesTable,
        prefix: &str,
    ) -> Result<SavedArtifact, PersistError> {
        if table.is_empty() {
            return Err(PersistError::EmptyTable);
        }

        let created_dir = if self.storage_dir.exists() {
            None
        } else {
            fs::create_dir_all(&self.storage_dir).map_err(|source| PersistError::CreateDir {
                dir: self.storage_dir.clone(),
                source,
            })?;
            Some(self.storage_dir.clone())
        };

        let bytes = match store::encode_csv(table) {
            Ok(bytes) => bytes,
            Err(source) => {
                return Err(PersistError::Write {
                    path: self.artifact_path(prefix),
                    source,
                })
            }
        };

        let name = store::file_name(
            self.naming,
            prefix,
            &self.request,
            &bytes,
            chrono::Local::now().naive_local(),
        );
        let path = self.storage_dir.join(name);

        store::write_atomic(&path, &bytes).map_err(|e| PersistError::Write {
            path: path.clone(),
            source: e.into(),
        })?;

        tracing::debug!(path = %path.display(), rows = table.len(), "persisted table");
        Ok(SavedArtifact { path, created_dir })
    }

    /// Save `table`, reporting every outcome. Returns the path on success.
    pub fn persist(&self, table: &TimeSeriesTable, prefix: &str) -> Option<PathBuf> {
        match self.try_persist(table, prefix) {
            Ok(saved) => {
                if let Some(dir) = saved.created_dir {
                    self.reporter.report(&Diagnostic::CreatedDirectory { dir });
                }
                self.reporter.report(&Diagnostic::Saved {
                    path: saved.path.clone(),
                });
                Some(saved.path)
            }
            Err(PersistError::EmptyTable) => {
                self.reporter.report(&Diagnostic::NothingToSave);
                None
            }
            Err(PersistError::CreateDir { dir, source }) => {
                self.reporter.report(&Diagnostic::DirectoryCreationFailed {
                    dir,
                    error: source.to_string(),
                });
                None
            }
            Err(PersistError::Write { path, source }) => {
                self.reporter.report(&Diagnostic::SaveFailed {
                    path,
                    error: source.to_string(),
                });
                None
            }
        }
    }
}
