//! Signal composition.
//!
//! Every bar starts Flat. Enabled rules are applied in the order returned by
//! [`StrategyConfig::rules`]; wherever a rule fires it overwrites the signal
//! for that bar, so a later rule wins over an earlier one on the same bar.
//! Bars where no rule fires keep whatever was assigned last. Undefined
//! indicator values (warm-up) never fire.

use crate::domain::indicator::{
    calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma, IndicatorValue,
};
use crate::domain::market_series::MarketSeries;
use crate::domain::signal::Signal;
use crate::domain::strategy::{SignalRule, StrategyConfig, RSI_OVERBOUGHT, RSI_OVERSOLD};

pub fn compose(series: &MarketSeries, config: &StrategyConfig) -> Vec<Signal> {
    config
        .rules()
        .iter()
        .fold(vec![Signal::Flat; series.len()], |signals, rule| {
            apply_rule(signals, &evaluate_rule(rule, series))
        })
}

/// Per-bar output of one rule: `Some` where the rule fires.
pub fn evaluate_rule(rule: &SignalRule, series: &MarketSeries) -> Vec<Option<Signal>> {
    match *rule {
        SignalRule::PriceVsMovingAverage { period } => {
            let sma = calculate_sma(series, period);
            (0..series.len())
                .map(|i| {
                    let ma = sma.simple(i)?;
                    compare(series.close(i), ma, Signal::Long, Signal::Short)
                })
                .collect()
        }
        SignalRule::RsiThreshold { period } => {
            let rsi = calculate_rsi(series, period);
            (0..series.len())
                .map(|i| {
                    let value = rsi.simple(i)?;
                    if value > RSI_OVERBOUGHT {
                        Some(Signal::Short)
                    } else if value < RSI_OVERSOLD {
                        Some(Signal::Long)
                    } else {
                        None
                    }
                })
                .collect()
        }
        SignalRule::MacdCrossover {
            short,
            long,
            signal,
        } => {
            let macd = calculate_macd(series, short, long, signal);
            (0..series.len())
                .map(|i| match macd.value(i)? {
                    IndicatorValue::Macd { line, signal, .. } => {
                        compare(line, signal, Signal::Long, Signal::Short)
                    }
                    _ => None,
                })
                .collect()
        }
        SignalRule::BollingerReversion {
            period,
            stddev_mult_x100,
        } => {
            let bands = calculate_bollinger(series, period, stddev_mult_x100);
            (0..series.len())
                .map(|i| match bands.value(i)? {
                    IndicatorValue::Bollinger { upper, lower, .. } => {
                        let close = series.close(i);
                        if close > upper {
                            Some(Signal::Short)
                        } else if close < lower {
                            Some(Signal::Long)
                        } else {
                            None
                        }
                    }
                    _ => None,
                })
                .collect()
        }
    }
}

/// New signal series with every fired bar overwritten.
fn apply_rule(previous: Vec<Signal>, fired: &[Option<Signal>]) -> Vec<Signal> {
    assert_eq!(previous.len(), fired.len(), "rule output misaligned with series");
    previous
        .into_iter()
        .zip(fired)
        .map(|(prev, fire)| fire.unwrap_or(prev))
        .collect()
}

fn compare(left: f64, right: f64, above: Signal, below: Signal) -> Option<Signal> {
    if left > right {
        Some(above)
    } else if left < right {
        Some(below)
    } else {
        None
    }
}
