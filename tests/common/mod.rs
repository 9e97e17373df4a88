#![allow(dead_code)]

use algoblocks::domain::error::AlgoblocksError;
use algoblocks::domain::market_series::{Bar, MarketSeries};
use algoblocks::domain::settings::{Interval, Lookback};
use algoblocks::ports::data_port::MarketDataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, Lookback, Interval)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_bars(
        &self,
        ticker: &str,
        lookback: Lookback,
        interval: Interval,
    ) -> Result<Vec<Bar>, AlgoblocksError> {
        self.requests
            .borrow_mut()
            .push((ticker.to_string(), lookback, interval));
        if let Some(reason) = self.errors.get(ticker) {
            return Err(AlgoblocksError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }
}

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// One bar per calendar day from 2024-01-02.
pub fn daily_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: start() + chrono::Duration::days(i as i64),
            close,
        })
        .collect()
}

/// One bar per minute from 2024-01-02 09:30.
pub fn minute_bars(closes: &[f64]) -> Vec<Bar> {
    let open = start() + chrono::Duration::minutes(9 * 60 + 30);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: open + chrono::Duration::minutes(i as i64),
            close,
        })
        .collect()
}

pub fn make_series(closes: &[f64]) -> MarketSeries {
    MarketSeries::new("TEST", daily_bars(closes)).unwrap()
}

/// Deterministic oscillating price path with drift.
pub fn wave_prices(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.05 * t + 8.0 * (t * 0.31).sin() + 3.0 * (t * 1.7).cos()
        })
        .collect()
}

/// CSV content with the given closes, one row per day.
pub fn daily_csv(closes: &[f64]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for bar in daily_bars(closes) {
        out.push_str(&format!(
            "{},{c},{c},{c},{c},1000\n",
            bar.timestamp.format("%Y-%m-%d"),
            c = bar.close
        ));
    }
    out
}
