//! Declarative strategy configuration.
//!
//! A strategy is a set of optional rule switches. An absent key disables
//! its rule; a present key must carry a valid value.

use crate::domain::error::AlgoblocksError;
use crate::domain::indicator::{bollinger, macd, IndicatorType};
use crate::ports::config_port::{parse_bool, ConfigPort};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// RSI above this level reads as overbought (Short).
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// RSI below this level reads as oversold (Long).
pub const RSI_OVERSOLD: f64 = 30.0;

/// Deserializing goes through [`StrategyConfig::from_json_value`], so serde
/// input gets the same checks as a strategy file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct StrategyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma_period: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi_period: Option<usize>,
    pub use_macd: bool,
    pub use_bollinger: bool,
}

/// A rule the signal composer applies, in the order it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalRule {
    /// Long above the moving average, Short below it.
    PriceVsMovingAverage { period: usize },
    /// Short when overbought, Long when oversold.
    RsiThreshold { period: usize },
    /// Long when the MACD line is above its signal line, Short when below.
    MacdCrossover {
        short: usize,
        long: usize,
        signal: usize,
    },
    /// Short above the upper band, Long below the lower band.
    BollingerReversion {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl SignalRule {
    pub fn indicator(&self) -> IndicatorType {
        match *self {
            SignalRule::PriceVsMovingAverage { period } => IndicatorType::Sma(period),
            SignalRule::RsiThreshold { period } => IndicatorType::Rsi(period),
            SignalRule::MacdCrossover {
                short,
                long,
                signal,
            } => IndicatorType::Macd {
                short,
                long,
                signal,
            },
            SignalRule::BollingerReversion {
                period,
                stddev_mult_x100,
            } => IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            },
        }
    }
}

impl StrategyConfig {
    /// Parse a JSON object such as
    /// `{"ticker": "AAPL", "ma_period": 20, "use_macd": true}`.
    ///
    /// `null` values count as absent and unknown keys are ignored.
    pub fn from_json_str(input: &str) -> Result<Self, AlgoblocksError> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| AlgoblocksError::invalid_config("<json>", e.to_string()))?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(value: &Value) -> Result<Self, AlgoblocksError> {
        let object = value
            .as_object()
            .ok_or_else(|| AlgoblocksError::invalid_config("<json>", "expected a JSON object"))?;

        let field = |key: &str| object.get(key).filter(|v| !v.is_null());

        let ticker = match field("ticker") {
            Some(Value::String(s)) => non_empty_ticker(s),
            Some(other) => {
                return Err(AlgoblocksError::invalid_config(
                    "ticker",
                    format!("expected a string, got {}", other),
                ));
            }
            None => None,
        };

        let period = |key: &str| -> Result<Option<usize>, AlgoblocksError> {
            match field(key) {
                Some(v) => match v.as_i64() {
                    Some(n) => validate_period(key, n).map(Some),
                    None => Err(AlgoblocksError::invalid_config(
                        key,
                        format!("expected an integer, got {}", v),
                    )),
                },
                None => Ok(None),
            }
        };

        let flag = |key: &str| -> Result<bool, AlgoblocksError> {
            match field(key) {
                Some(Value::Bool(b)) => Ok(*b),
                Some(other) => Err(AlgoblocksError::invalid_config(
                    key,
                    format!("expected true/false, got {}", other),
                )),
                None => Ok(false),
            }
        };

        Ok(Self {
            ticker,
            ma_period: period("ma_period")?,
            rsi_period: period("rsi_period")?,
            use_macd: flag("use_macd")?,
            use_bollinger: flag("use_bollinger")?,
        })
    }

    /// Read the `[strategy]` section of a settings file.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AlgoblocksError> {
        const SECTION: &str = "strategy";

        let period = |key: &str| -> Result<Option<usize>, AlgoblocksError> {
            match config.get_string(SECTION, key) {
                Some(raw) => {
                    let n = raw.trim().parse::<i64>().map_err(|_| {
                        AlgoblocksError::invalid_config(
                            key,
                            format!("expected an integer, got '{}'", raw),
                        )
                    })?;
                    validate_period(key, n).map(Some)
                }
                None => Ok(None),
            }
        };

        let flag = |key: &str| -> Result<bool, AlgoblocksError> {
            match config.get_string(SECTION, key) {
                Some(raw) => parse_bool(&raw).ok_or_else(|| {
                    AlgoblocksError::invalid_config(
                        key,
                        format!("expected true/false, got '{}'", raw),
                    )
                }),
                None => Ok(false),
            }
        };

        Ok(Self {
            ticker: config
                .get_string(SECTION, "ticker")
                .and_then(|t| non_empty_ticker(&t)),
            ma_period: period("ma_period")?,
            rsi_period: period("rsi_period")?,
            use_macd: flag("use_macd")?,
            use_bollinger: flag("use_bollinger")?,
        })
    }

    /// Re-check invariants on a value built by hand.
    pub fn validate(&self) -> Result<(), AlgoblocksError> {
        if self.ma_period == Some(0) {
            return Err(AlgoblocksError::invalid_config("ma_period", "must be positive"));
        }
        if self.rsi_period == Some(0) {
            return Err(AlgoblocksError::invalid_config("rsi_period", "must be positive"));
        }
        Ok(())
    }

    /// Enabled rules in application order: MA, RSI, MACD, Bollinger.
    pub fn rules(&self) -> Vec<SignalRule> {
        let mut rules = Vec::new();
        if let Some(period) = self.ma_period {
            rules.push(SignalRule::PriceVsMovingAverage { period });
        }
        if let Some(period) = self.rsi_period {
            rules.push(SignalRule::RsiThreshold { period });
        }
        if self.use_macd {
            rules.push(SignalRule::MacdCrossover {
                short: macd::DEFAULT_SHORT,
                long: macd::DEFAULT_LONG,
                signal: macd::DEFAULT_SIGNAL,
            });
        }
        if self.use_bollinger {
            rules.push(SignalRule::BollingerReversion {
                period: bollinger::DEFAULT_PERIOD,
                stddev_mult_x100: bollinger::DEFAULT_STDDEV_MULT_X100,
            });
        }
        rules
    }

    pub fn indicators(&self) -> Vec<IndicatorType> {
        self.rules().iter().map(SignalRule::indicator).collect()
    }

    /// Minimum bars for every enabled indicator to be defined somewhere and
    /// for at least one return to exist.
    pub fn required_history(&self) -> usize {
        self.indicators()
            .iter()
            .map(IndicatorType::lookback)
            .fold(2, usize::max)
    }
}

impl TryFrom<Value> for StrategyConfig {
    type Error = AlgoblocksError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json_value(&value)
    }
}

fn validate_period(key: &str, value: i64) -> Result<usize, AlgoblocksError> {
    if value <= 0 {
        return Err(AlgoblocksError::invalid_config(
            key,
            format!("must be positive, got {}", value),
        ));
    }
    usize::try_from(value)
        .map_err(|_| AlgoblocksError::invalid_config(key, format!("out of range: {}", value)))
}

fn non_empty_ticker(raw: &str) -> Option<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() { None } else { Some(ticker) }
}

/// A strategy configuration persisted under a unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredStrategy {
    pub name: String,
    pub config: StrategyConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn empty_object_enables_nothing() {
        let config = StrategyConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StrategyConfig::default());
        assert!(config.rules().is_empty());
        assert_eq!(config.required_history(), 2);
    }

    #[test]
    fn parses_all_keys() {
        let config = StrategyConfig::from_json_str(
            r#"{"ticker": "msft", "ma_period": 20, "rsi_period": 14,
                "use_macd": true, "use_bollinger": false}"#,
        )
        .unwrap();

        assert_eq!(config.ticker.as_deref(), Some("MSFT"));
        assert_eq!(config.ma_period, Some(20));
        assert_eq!(config.rsi_period, Some(14));
        assert!(config.use_macd);
        assert!(!config.use_bollinger);
    }

    #[test]
    fn null_and_unknown_keys_are_ignored() {
        let config =
            StrategyConfig::from_json_str(r#"{"ma_period": null, "name": "x"}"#).unwrap();
        assert_eq!(config.ma_period, None);
    }

    #[test]
    fn zero_period_is_invalid() {
        let err = StrategyConfig::from_json_str(r#"{"ma_period": 0}"#).unwrap_err();
        assert!(matches!(err, AlgoblocksError::InvalidConfig { ref key, .. } if key == "ma_period"));
    }

    #[test]
    fn negative_period_is_invalid() {
        let err = StrategyConfig::from_json_str(r#"{"rsi_period": -3}"#).unwrap_err();
        assert!(matches!(err, AlgoblocksError::InvalidConfig { ref key, .. } if key == "rsi_period"));
    }

    #[test]
    fn non_integer_period_is_invalid() {
        for input in [r#"{"ma_period": 2.5}"#, r#"{"ma_period": "20"}"#] {
            let err = StrategyConfig::from_json_str(input).unwrap_err();
            assert!(matches!(err, AlgoblocksError::InvalidConfig { .. }), "{}", input);
        }
    }

    #[test]
    fn non_bool_flag_is_invalid() {
        let err = StrategyConfig::from_json_str(r#"{"use_macd": "yes"}"#).unwrap_err();
        assert!(matches!(err, AlgoblocksError::InvalidConfig { ref key, .. } if key == "use_macd"));
    }

    #[test]
    fn serde_deserialize_validates() {
        let err = serde_json::from_str::<StrategyConfig>(r#"{"ma_period": 0}"#).unwrap_err();
        assert!(err.to_string().contains("ma_period"));

        let config: StrategyConfig =
            serde_json::from_str(r#"{"ticker": "spy", "use_bollinger": true}"#).unwrap();
        assert_eq!(config.ticker.as_deref(), Some("SPY"));
        assert!(config.use_bollinger);
        assert_eq!(config.ma_period, None);
    }

    #[test]
    fn malformed_json_is_invalid() {
        let err = StrategyConfig::from_json_str("{ma_period: ").unwrap_err();
        assert!(matches!(err, AlgoblocksError::InvalidConfig { .. }));

        let err = StrategyConfig::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, AlgoblocksError::InvalidConfig { .. }));
    }

    #[test]
    fn rules_follow_fixed_order() {
        let config = StrategyConfig {
            ticker: None,
            ma_period: Some(5),
            rsi_period: Some(14),
            use_macd: true,
            use_bollinger: true,
        };
        let rules = config.rules();

        assert_eq!(rules.len(), 4);
        assert_eq!(rules[0], SignalRule::PriceVsMovingAverage { period: 5 });
        assert_eq!(rules[1], SignalRule::RsiThreshold { period: 14 });
        assert!(matches!(rules[2], SignalRule::MacdCrossover { .. }));
        assert!(matches!(rules[3], SignalRule::BollingerReversion { .. }));
    }

    #[test]
    fn required_history_is_largest_lookback() {
        let config = StrategyConfig {
            ma_period: Some(5),
            rsi_period: Some(14),
            use_macd: true,
            ..StrategyConfig::default()
        };
        assert_eq!(config.required_history(), 14);

        let config = StrategyConfig {
            ma_period: Some(5),
            use_bollinger: true,
            ..StrategyConfig::default()
        };
        assert_eq!(config.required_history(), 20);

        let config = StrategyConfig {
            use_macd: true,
            ..StrategyConfig::default()
        };
        assert_eq!(config.required_history(), 2);
    }

    #[test]
    fn from_config_reads_strategy_section() {
        let adapter = FileConfigAdapter::from_string(
            "[strategy]\nticker = aapl\nma_period = 10\nuse_bollinger = yes\n",
        )
        .unwrap();
        let config = StrategyConfig::from_config(&adapter).unwrap();

        assert_eq!(config.ticker.as_deref(), Some("AAPL"));
        assert_eq!(config.ma_period, Some(10));
        assert_eq!(config.rsi_period, None);
        assert!(config.use_bollinger);
        assert!(!config.use_macd);
    }

    #[test]
    fn from_config_rejects_malformed_values() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nrsi_period = abc\n").unwrap();
        assert!(matches!(
            StrategyConfig::from_config(&adapter),
            Err(AlgoblocksError::InvalidConfig { .. })
        ));

        let adapter = FileConfigAdapter::from_string("[strategy]\nma_period = 0\n").unwrap();
        assert!(matches!(
            StrategyConfig::from_config(&adapter),
            Err(AlgoblocksError::InvalidConfig { .. })
        ));

        let adapter = FileConfigAdapter::from_string("[strategy]\nuse_macd = maybe\n").unwrap();
        assert!(matches!(
            StrategyConfig::from_config(&adapter),
            Err(AlgoblocksError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn validate_catches_zero_periods() {
        let config = StrategyConfig {
            ma_period: Some(0),
            ..StrategyConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(StrategyConfig::default().validate().is_ok());
    }

    #[test]
    fn serializes_without_absent_keys() {
        let config = StrategyConfig {
            ma_period: Some(20),
            ..StrategyConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"ma_period":20,"use_macd":false,"use_bollinger":false}"#);
    }
}
