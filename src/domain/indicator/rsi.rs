//! RSI (Relative Strength Index) indicator.
//!
//! Uses simple rolling means (not Wilder smoothing) of gains and losses:
//! - delta[0] = 0, delta[i] = C[i] - C[i-1]
//! - avg_gain = mean(max(delta, 0)) over n bars
//! - avg_loss = mean(max(-delta, 0)) over n bars
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100 when avg_gain > 0, 50 when both are 0.
//!
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{rolling_mean, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::market_series::MarketSeries;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(series: &MarketSeries, period: usize) -> IndicatorSeries {
    let closes = series.closes();
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        let change = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let values = rolling_mean(&gains, period)
        .into_iter()
        .zip(rolling_mean(&losses, period))
        .map(|(gain, loss)| match (gain, loss) {
            (Some(g), Some(l)) => Some(IndicatorValue::Simple(rsi_from_averages(g, l))),
            _ => None,
        })
        .collect();

    IndicatorSeries::aligned(IndicatorType::Rsi(period), series, values)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { 100.0 } else { 50.0 };
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}
