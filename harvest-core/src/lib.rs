//! harvest core: market history collection and document text extraction.
//!
//! Two independent pieces share this crate:
//! - `data`: fetch one symbol's OHLCV history from a provider, preview it,
//!   and persist it as CSV under a predictable file name
//! - `documents`: concatenate the text of every page of a list of PDFs

pub mod config;
pub mod data;
pub mod documents;
pub mod domain;

pub use config::{ConfigError, HarvestConfig};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: collector inputs can cross threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::TimeSeriesTable>();
        require_sync::<domain::TimeSeriesTable>();
        require_send::<domain::TimeSeriesRequest>();
        require_sync::<domain::TimeSeriesRequest>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::MemoryReporter>();
        require_sync::<data::MemoryReporter>();
        require_send::<data::TimeSeriesCollector>();
        require_sync::<data::TimeSeriesCollector>();
    }
}
