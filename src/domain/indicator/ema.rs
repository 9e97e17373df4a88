//! Exponential Moving Average indicator.
//!
//! alpha = 2/(n+1), EMA[0] = C[0], then EMA[i] = C[i]*alpha + EMA[i-1]*(1-alpha).
//! No bias adjustment: early values lean toward the seed. Defined from bar 0.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::market_series::MarketSeries;

pub fn calculate_ema(series: &MarketSeries, span: usize) -> IndicatorSeries {
    let values = ema_values(&series.closes(), span)
        .into_iter()
        .map(|v| Some(IndicatorValue::Simple(v)))
        .collect();

    IndicatorSeries::aligned(IndicatorType::Ema(span), series, values)
}

/// Recursive EMA over raw values. A span of 0 is treated as 1.
pub fn ema_values(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());

    for (i, &value) in values.iter().enumerate() {
        if i == 0 {
            out.push(value);
        } else {
            let prev = out[i - 1];
            out.push(value * alpha + prev * (1.0 - alpha));
        }
    }

    out
}
