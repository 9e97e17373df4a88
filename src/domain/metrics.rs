//! Performance evaluation of a signal series against its market series.
//!
//! The signal at bar `t-1` is the position held over the move from `t-1` to
//! `t`, so a signal never earns the return of the bar that produced it.

use crate::domain::error::AlgoblocksError;
use crate::domain::market_series::MarketSeries;
use crate::domain::signal::Signal;

/// Deviations at or below this are treated as zero when annualizing.
const MIN_STDDEV: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    /// Simple close-to-close returns; undefined at bar 0.
    pub returns: Vec<Option<f64>>,
    pub strategy_returns: Vec<f64>,
    pub cumulative_market: Vec<f64>,
    pub cumulative_strategy: Vec<f64>,
    pub sharpe_ratio: Option<f64>,
    /// Largest peak-to-trough fall of the strategy curve, as a non-positive fraction.
    pub max_drawdown: f64,
    pub total_return: f64,
}

impl Performance {
    /// # Panics
    ///
    /// When `signals` and `series` differ in length.
    pub fn evaluate(
        series: &MarketSeries,
        signals: &[Signal],
        annualization_factor: f64,
    ) -> Result<Self, AlgoblocksError> {
        assert_eq!(
            signals.len(),
            series.len(),
            "signal series length must match market series length"
        );

        if series.len() < 2 {
            return Err(AlgoblocksError::InsufficientHistory {
                ticker: series.ticker().to_string(),
                bars: series.len(),
                minimum: 2,
            });
        }

        let closes = series.closes();
        let returns: Vec<Option<f64>> = std::iter::once(None)
            .chain(closes.windows(2).map(|w| Some((w[1] - w[0]) / w[0])))
            .collect();

        let strategy_returns: Vec<f64> = std::iter::once(0.0)
            .chain(
                signals
                    .windows(2)
                    .zip(&returns[1..])
                    .map(|(s, r)| s[0].as_f64() * r.unwrap_or(0.0)),
            )
            .collect();

        let cumulative_market = compound(returns.iter().map(|r| r.unwrap_or(0.0)));
        let cumulative_strategy = compound(strategy_returns.iter().copied());

        let sharpe_ratio = sharpe(&strategy_returns[1..], annualization_factor);
        let max_drawdown = max_drawdown(&cumulative_strategy);
        let total_return = cumulative_strategy.last().copied().unwrap_or(1.0) - 1.0;

        Ok(Self {
            returns,
            strategy_returns,
            cumulative_market,
            cumulative_strategy,
            sharpe_ratio,
            max_drawdown,
            total_return,
        })
    }

    pub fn market_total_return(&self) -> f64 {
        self.cumulative_market.last().copied().unwrap_or(1.0) - 1.0
    }
}

/// Running product of `1 + r`.
fn compound(returns: impl Iterator<Item = f64>) -> Vec<f64> {
    returns
        .scan(1.0_f64, |equity, r| {
            *equity *= 1.0 + r;
            Some(*equity)
        })
        .collect()
}

/// Annualized mean over sample standard deviation.
fn sharpe(returns: &[f64], annualization_factor: f64) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if !stddev.is_finite() || stddev <= MIN_STDDEV {
        return None;
    }

    let ratio = mean / stddev * annualization_factor.sqrt();
    ratio.is_finite().then_some(ratio)
}

fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for &equity in equity_curve {
        peak = peak.max(equity);
        if peak > 0.0 {
            worst = worst.min((equity - peak) / peak);
        }
    }

    worst
}
