//! CSV file market data adapter.
//!
//! One file per ticker and interval: `<base>/<TICKER>_<interval>.csv`.
//! Only the timestamp and close columns are read; any others are ignored.

use crate::domain::error::AlgoblocksError;
use crate::domain::market_series::Bar;
use crate::domain::settings::{Interval, Lookback};
use crate::ports::data_port::MarketDataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Accepted timestamp header names, in priority order.
const TIMESTAMP_COLUMNS: [&str; 4] = ["datetime", "date", "timestamp", "time"];
const CLOSE_COLUMN: &str = "close";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"];

#[derive(Debug, Clone)]
pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Tickers name a file inside the base directory and never a path.
    fn csv_path(&self, ticker: &str, interval: Interval) -> Result<PathBuf, AlgoblocksError> {
        if ticker.is_empty() || ticker.contains(['/', '\\']) || ticker.contains("..") {
            return Err(AlgoblocksError::invalid_config(
                "ticker",
                format!("'{}' is not a valid ticker symbol", ticker),
            ));
        }
        Ok(self
            .base_path
            .join(format!("{}_{}.csv", ticker.to_uppercase(), interval)))
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        ticker: &str,
        lookback: Lookback,
        interval: Interval,
    ) -> Result<Vec<Bar>, AlgoblocksError> {
        let path = self.csv_path(ticker, interval)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no data file");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(AlgoblocksError::DataSource {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut bars = parse_bars(&content)?;
        bars.sort_by_key(|b| b.timestamp);

        let before = bars.len();
        bars.dedup_by_key(|b| b.timestamp);
        if bars.len() != before {
            tracing::warn!(
                path = %path.display(),
                dropped = before - bars.len(),
                "duplicate timestamps dropped"
            );
        }

        Ok(lookback.apply(bars))
    }
}

/// Parse every usable row. Rows with an empty or `nan` close are skipped.
pub fn parse_bars(content: &str) -> Result<Vec<Bar>, AlgoblocksError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| AlgoblocksError::DataSource {
            reason: format!("CSV header error: {}", e),
        })?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let available = || headers.join(", ");
    let timestamp_idx = TIMESTAMP_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
        .ok_or_else(|| AlgoblocksError::MissingField {
            field: "datetime".to_string(),
            available: available(),
        })?;
    let close_idx = headers
        .iter()
        .position(|h| h == CLOSE_COLUMN)
        .ok_or_else(|| AlgoblocksError::MissingField {
            field: CLOSE_COLUMN.to_string(),
            available: available(),
        })?;

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| AlgoblocksError::DataSource {
            reason: format!("CSV parse error: {}", e),
        })?;

        let raw_close = record.get(close_idx).unwrap_or("");
        if raw_close.is_empty() || raw_close.eq_ignore_ascii_case("nan") {
            continue;
        }
        let close: f64 = raw_close.parse().map_err(|_| AlgoblocksError::DataSource {
            reason: format!("row {}: invalid close value '{}'", row + 1, raw_close),
        })?;

        let raw_timestamp = record.get(timestamp_idx).unwrap_or("");
        let timestamp =
            parse_timestamp(raw_timestamp).ok_or_else(|| AlgoblocksError::DataSource {
                reason: format!("row {}: invalid timestamp '{}'", row + 1, raw_timestamp),
            })?;

        bars.push(Bar { timestamp, close });
    }

    Ok(bars)
}

/// Dates, naive datetimes, or datetimes with a UTC offset. An offset is
/// dropped and the wall-clock time kept.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(raw, f).ok())
    {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
    {
        return Some(dt);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
