//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{rolling_mean, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::market_series::MarketSeries;

pub fn calculate_sma(series: &MarketSeries, period: usize) -> IndicatorSeries {
    let values = rolling_mean(&series.closes(), period)
        .into_iter()
        .map(|v| v.map(IndicatorValue::Simple))
        .collect();

    IndicatorSeries::aligned(IndicatorType::Sma(period), series, values)
}
