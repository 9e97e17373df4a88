//! Engine settings: history window, sampling interval, annualization and
//! output formatting for each run mode.
//!
//! Everything has a built-in default so an empty settings file is valid.
//! Values that are present but malformed are rejected rather than defaulted.

use crate::domain::error::AlgoblocksError;
use crate::domain::market_series::Bar;
use crate::ports::config_port::ConfigPort;
use chrono::format::{Item, StrftimeItems};
use chrono::{Months, NaiveDate};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_DATA_DIR: &str = "data";

/// Trading days per year.
pub const DAILY_ANNUALIZATION: f64 = 252.0;
/// Regular-session minutes per trading day.
pub const MINUTES_PER_SESSION: f64 = 390.0;

/// How much history to request, counted back from the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    /// Last N distinct trading dates.
    Days(u32),
    Months(u32),
    Years(u32),
    Max,
}

impl Lookback {
    /// Keep the bars inside the window. Input must be sorted by timestamp.
    pub fn apply(self, bars: Vec<Bar>) -> Vec<Bar> {
        let Some(last) = bars.last().map(|b| b.timestamp) else {
            return bars;
        };

        match self {
            Lookback::Max => bars,
            Lookback::Days(n) => {
                let mut dates: Vec<NaiveDate> = bars.iter().map(|b| b.timestamp.date()).collect();
                dates.dedup();
                if n == 0 {
                    return Vec::new();
                }
                let first_kept = dates[dates.len().saturating_sub(n as usize)];
                bars.into_iter()
                    .filter(|b| b.timestamp.date() >= first_kept)
                    .collect()
            }
            Lookback::Months(n) => Self::since(bars, last.checked_sub_months(Months::new(n))),
            Lookback::Years(n) => Self::since(
                bars,
                last.checked_sub_months(Months::new(n.saturating_mul(12))),
            ),
        }
    }

    fn since(bars: Vec<Bar>, cutoff: Option<chrono::NaiveDateTime>) -> Vec<Bar> {
        match cutoff {
            Some(cutoff) => bars.into_iter().filter(|b| b.timestamp >= cutoff).collect(),
            None => bars,
        }
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "max" {
            return Ok(Lookback::Max);
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("lookback '{}' has no unit", s))?;
        let (count, unit) = s.split_at(split);
        let count: u32 = count
            .parse()
            .map_err(|_| format!("lookback '{}' must start with a count", s))?;
        if count == 0 {
            return Err(format!("lookback '{}' must be positive", s));
        }

        match unit {
            "d" => Ok(Lookback::Days(count)),
            "mo" => Ok(Lookback::Months(count)),
            "y" => Ok(Lookback::Years(count)),
            _ => Err(format!(
                "unknown lookback unit '{}', expected d, mo, y or max",
                unit
            )),
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Days(n) => write!(f, "{}d", n),
            Lookback::Months(n) => write!(f, "{}mo", n),
            Lookback::Years(n) => write!(f, "{}y", n),
            Lookback::Max => write!(f, "max"),
        }
    }
}

/// Bar sampling granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Minute1,
    Minute5,
    Minute15,
    Minute30,
    Hour1,
    Day1,
    Week1,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Hour1 => "1h",
            Interval::Day1 => "1d",
            Interval::Week1 => "1wk",
        }
    }

    /// Bars per year, used to annualize the Sharpe ratio.
    pub fn default_annualization(self) -> f64 {
        match self {
            Interval::Minute1 => DAILY_ANNUALIZATION * MINUTES_PER_SESSION,
            Interval::Minute5 => DAILY_ANNUALIZATION * MINUTES_PER_SESSION / 5.0,
            Interval::Minute15 => DAILY_ANNUALIZATION * MINUTES_PER_SESSION / 15.0,
            Interval::Minute30 => DAILY_ANNUALIZATION * MINUTES_PER_SESSION / 30.0,
            Interval::Hour1 => DAILY_ANNUALIZATION * MINUTES_PER_SESSION / 60.0,
            Interval::Day1 => DAILY_ANNUALIZATION,
            Interval::Week1 => 52.0,
        }
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" => Ok(Interval::Minute1),
            "5m" => Ok(Interval::Minute5),
            "15m" => Ok(Interval::Minute15),
            "30m" => Ok(Interval::Minute30),
            "1h" | "60m" => Ok(Interval::Hour1),
            "1d" => Ok(Interval::Day1),
            "1wk" => Ok(Interval::Week1),
            other => Err(format!(
                "unknown interval '{}', expected one of 1m, 5m, 15m, 30m, 1h, 1d, 1wk",
                other
            )),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Backtest,
    Simulation,
}

impl RunMode {
    /// Settings file section holding this mode's overrides.
    pub fn section(self) -> &'static str {
        match self {
            RunMode::Backtest => "backtest",
            RunMode::Simulation => "simulate",
        }
    }
}

/// Parameters for one orchestrator variant.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub lookback: Lookback,
    pub interval: Interval,
    pub annualization_factor: f64,
    pub timestamp_format: String,
}

impl RunSettings {
    /// One year of daily bars.
    pub fn backtest_default() -> Self {
        Self {
            lookback: Lookback::Years(1),
            interval: Interval::Day1,
            annualization_factor: Interval::Day1.default_annualization(),
            timestamp_format: "%Y-%m-%d".to_string(),
        }
    }

    /// Five trading days of one-minute bars.
    pub fn simulation_default() -> Self {
        Self {
            lookback: Lookback::Days(5),
            interval: Interval::Minute1,
            annualization_factor: Interval::Minute1.default_annualization(),
            timestamp_format: "%H:%M".to_string(),
        }
    }

    pub fn default_for(mode: RunMode) -> Self {
        match mode {
            RunMode::Backtest => Self::backtest_default(),
            RunMode::Simulation => Self::simulation_default(),
        }
    }

    /// Mode defaults overridden by the mode's settings section. When the
    /// interval is overridden but the annualization factor is not, the factor
    /// follows the interval.
    pub fn from_config(config: &dyn ConfigPort, mode: RunMode) -> Result<Self, AlgoblocksError> {
        let section = mode.section();
        let defaults = Self::default_for(mode);

        let lookback = match config.get_string(section, "lookback") {
            Some(raw) => raw
                .parse::<Lookback>()
                .map_err(|reason| AlgoblocksError::settings_invalid(section, "lookback", reason))?,
            None => defaults.lookback,
        };

        let interval = match config.get_string(section, "interval") {
            Some(raw) => raw
                .parse::<Interval>()
                .map_err(|reason| AlgoblocksError::settings_invalid(section, "interval", reason))?,
            None => defaults.interval,
        };

        let annualization_factor = config
            .get_double(section, "annualization_factor")?
            .unwrap_or_else(|| interval.default_annualization());
        if !annualization_factor.is_finite() || annualization_factor <= 0.0 {
            return Err(AlgoblocksError::settings_invalid(
                section,
                "annualization_factor",
                "annualization_factor must be positive",
            ));
        }

        let timestamp_format = config
            .get_string(section, "timestamp_format")
            .unwrap_or(defaults.timestamp_format);
        validate_timestamp_format(section, &timestamp_format)?;

        Ok(Self {
            lookback,
            interval,
            annualization_factor,
            timestamp_format,
        })
    }
}

fn validate_timestamp_format(section: &str, format: &str) -> Result<(), AlgoblocksError> {
    if format.trim().is_empty() {
        return Err(AlgoblocksError::settings_invalid(
            section,
            "timestamp_format",
            "timestamp_format must not be empty",
        ));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(AlgoblocksError::settings_invalid(
            section,
            "timestamp_format",
            format!("'{}' is not a valid strftime pattern", format),
        ));
    }
    Ok(())
}

/// Process-wide settings from the `[engine]` section plus both run modes.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub default_ticker: String,
    pub data_dir: PathBuf,
    pub backtest: RunSettings,
    pub simulation: RunSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_ticker: DEFAULT_TICKER.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            backtest: RunSettings::backtest_default(),
            simulation: RunSettings::simulation_default(),
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AlgoblocksError> {
        let default_ticker = match config.get_string("engine", "default_ticker") {
            Some(raw) if raw.trim().is_empty() => {
                return Err(AlgoblocksError::settings_invalid(
                    "engine",
                    "default_ticker",
                    "default_ticker must not be empty",
                ));
            }
            Some(raw) => raw.trim().to_uppercase(),
            None => DEFAULT_TICKER.to_string(),
        };

        let data_dir = config
            .get_string("engine", "data_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Ok(Self {
            default_ticker,
            data_dir,
            backtest: RunSettings::from_config(config, RunMode::Backtest)?,
            simulation: RunSettings::from_config(config, RunMode::Simulation)?,
        })
    }

    pub fn run_settings(&self, mode: RunMode) -> &RunSettings {
        match mode {
            RunMode::Backtest => &self.backtest,
            RunMode::Simulation => &self.simulation,
        }
    }
}
