//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(short) - EMA(long)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: short=12, long=26, signal=9.
//! All three EMAs are seeded at bar 0, so every bar is defined.

use crate::domain::indicator::{ema_values, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::market_series::MarketSeries;

pub const DEFAULT_SHORT: usize = 12;
pub const DEFAULT_LONG: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    series: &MarketSeries,
    short: usize,
    long: usize,
    signal_span: usize,
) -> IndicatorSeries {
    let closes = series.closes();
    let ema_short = ema_values(&closes, short);
    let ema_long = ema_values(&closes, long);

    let macd_line: Vec<f64> = ema_short
        .iter()
        .zip(&ema_long)
        .map(|(s, l)| s - l)
        .collect();
    let signal_line = ema_values(&macd_line, signal_span);

    let values = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(&line, &signal)| {
            Some(IndicatorValue::Macd {
                line,
                signal,
                histogram: line - signal,
            })
        })
        .collect();

    IndicatorSeries::aligned(
        IndicatorType::Macd {
            short,
            long,
            signal: signal_span,
        },
        series,
        values,
    )
}
