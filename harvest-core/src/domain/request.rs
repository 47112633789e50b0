//! Request parameters for a single history fetch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building a [`TimeSeriesRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("symbol '{0}' must not contain path separators")]
    InvalidSymbol(String),

    #[error("unknown period '{0}' (valid: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)")]
    UnknownPeriod(String),

    #[error(
        "unknown interval '{0}' (valid: 1m, 2m, 5m, 15m, 30m, 60m, 90m, 1h, 1d, 5d, 1wk, 1mo, 3mo)"
    )]
    UnknownInterval(String),
}

/// Span of history to request, in the provider's range tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    OneDay,
    FiveDays,
    #[default]
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == token)
            .ok_or_else(|| RequestError::UnknownPeriod(token.to_string()))
    }
}

impl TryFrom<String> for Period {
    type Error = RequestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.as_str().to_string()
    }
}

/// Granularity of each data point, in the provider's interval tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interval {
    OneMinute,
    TwoMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    SixtyMinutes,
    NinetyMinutes,
    OneHour,
    #[default]
    OneDay,
    FiveDays,
    OneWeek,
    OneMonth,
    ThreeMonths,
}

impl Interval {
    pub const ALL: [Interval; 13] = [
        Interval::OneMinute,
        Interval::TwoMinutes,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::SixtyMinutes,
        Interval::NinetyMinutes,
        Interval::OneHour,
        Interval::OneDay,
        Interval::FiveDays,
        Interval::OneWeek,
        Interval::OneMonth,
        Interval::ThreeMonths,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::TwoMinutes => "2m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::SixtyMinutes => "60m",
            Interval::NinetyMinutes => "90m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
            Interval::FiveDays => "5d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
            Interval::ThreeMonths => "3mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == token)
            .ok_or_else(|| RequestError::UnknownInterval(token.to_string()))
    }
}

impl TryFrom<String> for Interval {
    type Error = RequestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(value: Interval) -> Self {
        value.as_str().to_string()
    }
}

/// Symbol + period + interval for one collector.
///
/// The symbol is stored uppercased, so every file name and message derived
/// from a request uses the same spelling regardless of how it was typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeSeriesRequest {
    symbol: String,
    period: Period,
    interval: Interval,
}

impl TimeSeriesRequest {
    pub fn new(symbol: &str, period: Period, interval: Interval) -> Result<Self, RequestError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(RequestError::EmptySymbol);
        }
        // The symbol becomes part of a file name
        if symbol.contains(['/', '\\']) {
            return Err(RequestError::InvalidSymbol(symbol.to_string()));
        }
        Ok(Self {
            symbol: symbol.to_uppercase(),
            period,
            interval,
        })
    }

    /// Build a request from raw string tokens (CLI and config input).
    pub fn parse(symbol: &str, period: &str, interval: &str) -> Result<Self, RequestError> {
        Self::new(symbol, period.parse()?, interval.parse()?)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }
}

impl fmt::Display for TimeSeriesRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Period: {}, Interval: {})",
            self.symbol, self.period, self.interval
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_uppercased_and_trimmed() {
        let req = TimeSeriesRequest::new("  msft ", Period::OneMonth, Interval::OneDay).unwrap();
        assert_eq!(req.symbol(), "MSFT");
    }

    #[test]
    fn empty_symbol_rejected() {
        let err = TimeSeriesRequest::new("   ", Period::OneMonth, Interval::OneDay).unwrap_err();
        assert_eq!(err, RequestError::EmptySymbol);
    }

    #[test]
    fn symbol_with_path_separator_rejected() {
        for raw in ["A/B", "..\\etc", "/AAPL"] {
            let err = TimeSeriesRequest::new(raw, Period::OneMonth, Interval::OneDay).unwrap_err();
            assert_eq!(err, RequestError::InvalidSymbol(raw.to_string()));
        }
        assert!(TimeSeriesRequest::new("BRK.B", Period::OneMonth, Interval::OneDay).is_ok());
    }

    #[test]
    fn tokens_parse_and_print_identically() {
        for p in Period::ALL {
            assert_eq!(p.as_str().parse::<Period>().unwrap(), p);
        }
        for i in Interval::ALL {
            assert_eq!(i.to_string().parse::<Interval>().unwrap(), i);
        }
    }

    #[test]
    fn unknown_tokens_rejected() {
        assert_eq!(
            "2mo".parse::<Period>().unwrap_err(),
            RequestError::UnknownPeriod("2mo".into())
        );
        assert_eq!(
            "1week".parse::<Interval>().unwrap_err(),
            RequestError::UnknownInterval("1week".into())
        );
    }

    #[test]
    fn parse_from_strings() {
        let req = TimeSeriesRequest::parse("aapl", "1y", "1wk").unwrap();
        assert_eq!(req.symbol(), "AAPL");
        assert_eq!(req.period(), Period::OneYear);
        assert_eq!(req.interval(), Interval::OneWeek);
        assert_eq!(req.to_string(), "AAPL (Period: 1y, Interval: 1wk)");
    }
}
