//! Strategy evaluation pipeline.
//!
//! fetch → validate series → check history → compose signals → evaluate.
//! The backtest and the realtime simulator are the same pipeline run with
//! different [`RunSettings`]; they differ only in the summary they report.

use crate::domain::composer::compose;
use crate::domain::error::AlgoblocksError;
use crate::domain::market_series::MarketSeries;
use crate::domain::metrics::Performance;
use crate::domain::settings::RunSettings;
use crate::domain::signal::Signal;
use crate::domain::strategy::StrategyConfig;
use crate::ports::data_port::MarketDataPort;
use serde::Serialize;

/// Everything computed for one strategy over one series.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub series: MarketSeries,
    pub signals: Vec<Signal>,
    pub performance: Performance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestSummary {
    pub market: Vec<f64>,
    pub strategy: Vec<f64>,
    pub sharpe: Option<f64>,
    pub max_drawdown: f64,
    pub total_return: f64,
    pub timestamps: Vec<String>,
}

impl BacktestSummary {
    pub fn from_evaluation(evaluation: &Evaluation, timestamp_format: &str) -> Self {
        let performance = &evaluation.performance;
        Self {
            market: performance.cumulative_market.clone(),
            strategy: performance.cumulative_strategy.clone(),
            sharpe: performance.sharpe_ratio,
            max_drawdown: performance.max_drawdown,
            total_return: performance.total_return,
            timestamps: evaluation.series.formatted_timestamps(timestamp_format),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub timestamps: Vec<String>,
    pub portfolio_value: Vec<f64>,
}

impl SimulationSummary {
    pub fn from_evaluation(evaluation: &Evaluation, timestamp_format: &str) -> Self {
        Self {
            timestamps: evaluation.series.formatted_timestamps(timestamp_format),
            portfolio_value: evaluation.performance.cumulative_strategy.clone(),
        }
    }
}

/// Failure payload in the same shape front ends already expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub error: String,
}

impl From<&AlgoblocksError> for ErrorSummary {
    fn from(err: &AlgoblocksError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// The ticker a config runs against: its own, else the engine default.
pub fn resolve_ticker(config: &StrategyConfig, default_ticker: &str) -> String {
    config
        .ticker
        .as_deref()
        .unwrap_or(default_ticker)
        .trim()
        .to_uppercase()
}

/// Fetch and validate the series for `ticker`.
pub fn load_series(
    data: &dyn MarketDataPort,
    ticker: &str,
    settings: &RunSettings,
) -> Result<MarketSeries, AlgoblocksError> {
    let bars = data.fetch_bars(ticker, settings.lookback, settings.interval)?;
    if bars.is_empty() {
        tracing::warn!(ticker, lookback = %settings.lookback, interval = %settings.interval, "no bars returned");
        return Err(AlgoblocksError::NoData {
            ticker: ticker.to_string(),
        });
    }

    tracing::debug!(ticker, bars = bars.len(), "fetched market data");
    MarketSeries::new(ticker, bars)
}

/// Run a strategy over an already loaded series.
pub fn evaluate_series(
    series: MarketSeries,
    config: &StrategyConfig,
    annualization_factor: f64,
) -> Result<Evaluation, AlgoblocksError> {
    config.validate()?;

    let minimum = config.required_history();
    if series.len() < minimum {
        return Err(AlgoblocksError::InsufficientHistory {
            ticker: series.ticker().to_string(),
            bars: series.len(),
            minimum,
        });
    }

    let signals = compose(&series, config);
    let performance = Performance::evaluate(&series, &signals, annualization_factor)?;

    tracing::debug!(
        ticker = series.ticker(),
        rules = config.rules().len(),
        total_return = performance.total_return,
        "strategy evaluated"
    );

    Ok(Evaluation {
        series,
        signals,
        performance,
    })
}

pub fn evaluate_strategy(
    data: &dyn MarketDataPort,
    config: &StrategyConfig,
    default_ticker: &str,
    settings: &RunSettings,
) -> Result<Evaluation, AlgoblocksError> {
    config.validate()?;
    let ticker = resolve_ticker(config, default_ticker);
    let series = load_series(data, &ticker, settings)?;
    evaluate_series(series, config, settings.annualization_factor)
}

pub fn run_backtest(
    data: &dyn MarketDataPort,
    config: &StrategyConfig,
    default_ticker: &str,
    settings: &RunSettings,
) -> Result<BacktestSummary, AlgoblocksError> {
    let evaluation = evaluate_strategy(data, config, default_ticker, settings)?;
    tracing::info!(
        ticker = evaluation.series.ticker(),
        bars = evaluation.series.len(),
        sharpe = ?evaluation.performance.sharpe_ratio,
        max_drawdown = evaluation.performance.max_drawdown,
        total_return = evaluation.performance.total_return,
        market_return = evaluation.performance.market_total_return(),
        "backtest complete"
    );
    Ok(BacktestSummary::from_evaluation(
        &evaluation,
        &settings.timestamp_format,
    ))
}

pub fn run_simulation(
    data: &dyn MarketDataPort,
    config: &StrategyConfig,
    default_ticker: &str,
    settings: &RunSettings,
) -> Result<SimulationSummary, AlgoblocksError> {
    let evaluation = evaluate_strategy(data, config, default_ticker, settings)?;
    tracing::info!(
        ticker = evaluation.series.ticker(),
        bars = evaluation.series.len(),
        final_value = evaluation.performance.cumulative_strategy.last().copied(),
        "simulation complete"
    );
    Ok(SimulationSummary::from_evaluation(
        &evaluation,
        &settings.timestamp_format,
    ))
}
