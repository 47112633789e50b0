//! Domain types for harvest

pub mod bar;
pub mod request;

pub use bar::{Bar, TimeSeriesTable};
pub use request::{Interval, Period, RequestError, TimeSeriesRequest};
