//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is the sample standard deviation (divides by N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined; a period below 2 has no
//! sample deviation and is undefined everywhere.

use crate::domain::indicator::{
    rolling_mean, rolling_sample_stddev, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::market_series::MarketSeries;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STDDEV_MULT_X100: u32 = 200;

pub fn calculate_bollinger(
    series: &MarketSeries,
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let closes = series.closes();
    let mult = stddev_mult_x100 as f64 / 100.0;

    let values = rolling_mean(&closes, period)
        .into_iter()
        .zip(rolling_sample_stddev(&closes, period))
        .map(|(middle, stddev)| match (middle, stddev) {
            (Some(middle), Some(stddev)) => Some(IndicatorValue::Bollinger {
                upper: middle + mult * stddev,
                middle,
                lower: middle - mult * stddev,
            }),
            _ => None,
        })
        .collect();

    IndicatorSeries::aligned(
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        series,
        values,
    )
}
