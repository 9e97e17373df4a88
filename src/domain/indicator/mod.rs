//! Technical indicator implementations.
//!
//! Every calculation takes a [`MarketSeries`] and returns an
//! [`IndicatorSeries`] with exactly one point per bar. Bars inside an
//! indicator's warm-up window carry `None` rather than a sentinel value, so
//! comparisons against them never fire.
//!
//! - `IndicatorValue`: the output shape at one bar
//! - `IndicatorType`: indicator identity + parameters (usable as a map key)
//! - `IndicatorSeries`: the per-bar output aligned to the market series

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::calculate_bollinger;
pub use ema::{calculate_ema, ema_values};
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use crate::domain::market_series::MarketSeries;
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        short: usize,
        long: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    /// Bars needed before the indicator produces its first defined value.
    pub fn lookback(&self) -> usize {
        match self {
            IndicatorType::Sma(period)
            | IndicatorType::Rsi(period)
            | IndicatorType::Bollinger { period, .. } => *period,
            IndicatorType::Ema(_) | IndicatorType::Macd { .. } => 1,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd {
                short,
                long,
                signal,
            } => write!(f, "MACD({},{},{})", short, long, signal),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<IndicatorValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Zip computed values onto the series timestamps.
    pub(crate) fn aligned(
        indicator_type: IndicatorType,
        series: &MarketSeries,
        values: Vec<Option<IndicatorValue>>,
    ) -> Self {
        assert_eq!(
            values.len(),
            series.len(),
            "{} produced {} values for {} bars",
            indicator_type,
            values.len(),
            series.len()
        );

        let values = series
            .bars()
            .iter()
            .zip(values)
            .map(|(bar, value)| IndicatorPoint {
                timestamp: bar.timestamp,
                value,
            })
            .collect();

        Self {
            indicator_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: usize) -> Option<IndicatorValue> {
        self.values.get(index).and_then(|p| p.value)
    }

    /// The scalar at `index`, or `None` during warm-up or for multi-field values.
    pub fn simple(&self, index: usize) -> Option<f64> {
        match self.value(index) {
            Some(IndicatorValue::Simple(v)) => Some(v),
            _ => None,
        }
    }

    pub fn simple_values(&self) -> Vec<Option<f64>> {
        (0..self.values.len()).map(|i| self.simple(i)).collect()
    }

    /// Index of the first defined point.
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(|p| p.value.is_some())
    }
}

/// Trailing mean over `period` values; `None` until a full window exists.
///
/// Each window is summed from scratch so a window of one reproduces its
/// input exactly and results do not depend on accumulated rounding.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

/// Trailing sample standard deviation (N-1 divisor); `None` until a full
/// window exists and for windows shorter than two values.
pub(crate) fn rolling_sample_stddev(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period < 2 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance = window
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (period - 1) as f64;
            Some(variance.sqrt())
        })
        .collect()
}
