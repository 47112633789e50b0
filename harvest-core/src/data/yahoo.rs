//! Yahoo Finance history provider.
//!
//! Fetches OHLCV bars from Yahoo's v8 chart API using the `range` and
//! `interval` tokens of the request. One blocking round trip per fetch, bounded
//! by the configured timeout.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; parse failures surface as `DataError::ResponseFormatChanged`.

use super::provider::{DataError, HistoryProvider};
use crate::config::ProviderConfig;
use crate::domain::{Bar, TimeSeriesRequest, TimeSeriesTable};
use chrono::{DateTime, FixedOffset};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

/// Default endpoint host for the chart API.
pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance history provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: Url,
    timeout: Duration,
    adjust: bool,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, DataError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| DataError::Other(format!("invalid base url '{}': {e}", config.base_url)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
            adjust: config.adjust,
        })
    }

    /// Build the chart API URL for a request.
    fn chart_url(&self, request: &TimeSeriesRequest) -> Result<Url, DataError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DataError::Other("base url cannot take a path".into()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", request.symbol()]);
        url.query_pairs_mut()
            .append_pair("range", request.period().as_str())
            .append_pair("interval", request.interval().as_str())
            .append_pair("includeAdjustedClose", "true");
        Ok(url)
    }

    fn send(&self, request: &TimeSeriesRequest) -> Result<TimeSeriesTable, DataError> {
        let url = self.chart_url(request)?;
        let symbol = request.symbol();
        tracing::debug!(%url, "requesting chart");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.transport_error(e))?;
        let status = resp.status();

        // Unknown symbols come back as 404 with a chart error body.
        let body = resp.text().map_err(|e| self.transport_error(e))?;
        let chart: Result<ChartResponse, _> = serde_json::from_str(&body);

        if !status.is_success() {
            if let Ok(chart) = chart {
                if let Some(err) = chart.chart.error {
                    return Err(chart_error(symbol, err));
                }
            }
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let chart = chart.map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;
        parse_response(symbol, chart, self.adjust)
    }

    /// Classify a failure on the wire, while sending or while reading the body.
    fn transport_error(&self, e: reqwest::Error) -> DataError {
        if e.is_timeout() {
            DataError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            DataError::NetworkUnreachable(e.to_string())
        }
    }
}

fn chart_error(symbol: &str, err: ChartError) -> DataError {
    if err.code == "Not Found" {
        DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        }
    } else {
        DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
    }
}

/// Parse the chart API response into a table.
///
/// A result with no timestamps is a valid empty window, not an error.
fn parse_response(
    symbol: &str,
    resp: ChartResponse,
    adjust: bool,
) -> Result<TimeSeriesTable, DataError> {
    let result = match resp.chart.result {
        Some(result) => result,
        None => {
            return Err(match resp.chart.error {
                Some(err) => chart_error(symbol, err),
                None => DataError::ResponseFormatChanged("empty result with no error".into()),
            })
        }
    };

    let Some(data) = result.into_iter().next() else {
        return Ok(TimeSeriesTable::empty());
    };

    let Some(timestamps) = data.timestamp else {
        return Ok(TimeSeriesTable::empty());
    };

    let offset_secs = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let offset = FixedOffset::east_opt(offset_secs).ok_or_else(|| {
        DataError::ResponseFormatChanged(format!("invalid gmtoffset: {offset_secs}"))
    })?;

    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let mut bars = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        let timestamp: DateTime<FixedOffset> = DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.with_timezone(&offset))
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();

        // Skip rows where all OHLCV are None (halts, non-trading sessions)
        if open.is_none() && high.is_none() && low.is_none() && close.is_none() && volume.is_none()
        {
            continue;
        }

        let mut bar = Bar {
            timestamp,
            open: open.unwrap_or(f64::NAN),
            high: high.unwrap_or(f64::NAN),
            low: low.unwrap_or(f64::NAN),
            close: close.unwrap_or(f64::NAN),
            volume: volume.unwrap_or(0),
        };

        if adjust {
            let adj_close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());
            if let Some(adj) = adj_close {
                apply_adjustment(&mut bar, adj);
            }
        }

        bars.push(bar);
    }

    Ok(TimeSeriesTable::new(bars))
}

/// Scale OHLC by the adjusted/raw close ratio so splits and dividends are
/// folded into every price column.
fn apply_adjustment(bar: &mut Bar, adj_close: f64) {
    if bar.close.is_nan() || bar.close == 0.0 {
        return;
    }
    let ratio = adj_close / bar.close;
    bar.open *= ratio;
    bar.high *= ratio;
    bar.low *= ratio;
    bar.close = adj_close;
}

impl HistoryProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_history(&self, request: &TimeSeriesRequest) -> Result<TimeSeriesTable, DataError> {
        self.send(request)
    }
}
