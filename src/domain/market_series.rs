//! Price bars and the validated, time-ordered market series.

use crate::domain::error::AlgoblocksError;
use chrono::NaiveDateTime;

/// One sampled interval: its timestamp and closing price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub close: f64,
}

/// Immutable, strictly time-ordered close series for one ticker.
///
/// Only constructible through [`MarketSeries::new`], so every instance holds
/// at least one bar, finite positive closes and strictly increasing
/// timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSeries {
    ticker: String,
    bars: Vec<Bar>,
}

impl MarketSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<Bar>) -> Result<Self, AlgoblocksError> {
        let ticker = ticker.into();
        if bars.is_empty() {
            return Err(AlgoblocksError::NoData { ticker });
        }

        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(AlgoblocksError::InvalidSeries {
                    reason: format!(
                        "close at {} must be finite and positive, got {}",
                        bar.timestamp, bar.close
                    ),
                });
            }
            if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
                return Err(AlgoblocksError::InvalidSeries {
                    reason: format!(
                        "timestamps must be strictly increasing: {} follows {}",
                        bar.timestamp,
                        bars[i - 1].timestamp
                    ),
                });
            }
        }

        Ok(Self { ticker, bars })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn close(&self, index: usize) -> f64 {
        self.bars[index].close
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Timestamps rendered with a chrono format string.
    pub fn formatted_timestamps(&self, format: &str) -> Vec<String> {
        self.bars
            .iter()
            .map(|b| b.timestamp.format(format).to_string())
            .collect()
    }
}
