//! Domain error types.

/// Top-level error type for algoblocks.
///
/// Every variant is a recoverable condition surfaced to the caller. Internal
/// invariant violations (for example mismatched series lengths) panic instead.
#[derive(Debug, thiserror::Error)]
pub enum AlgoblocksError {
    #[error("settings parse error in {file}: {reason}")]
    SettingsParse { file: String, reason: String },

    #[error("missing setting [{section}] {key}")]
    SettingsMissing { section: String, key: String },

    #[error("invalid setting [{section}] {key}: {reason}")]
    SettingsInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid strategy config '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("no data found for ticker '{ticker}'")]
    NoData { ticker: String },

    #[error("'{field}' column not found. Available columns: {available}")]
    MissingField { field: String, available: String },

    #[error("insufficient history for {ticker}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        ticker: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid market series: {reason}")]
    InvalidSeries { reason: String },

    #[error("market data error: {reason}")]
    DataSource { reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("strategy '{name}' not found")]
    StrategyNotFound { name: String },

    #[error("strategy '{name}' already exists")]
    StrategyExists { name: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AlgoblocksError {
    pub(crate) fn invalid_config(key: &str, reason: impl Into<String>) -> Self {
        AlgoblocksError::InvalidConfig {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn settings_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        AlgoblocksError::SettingsInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl AlgoblocksError {
    /// Process exit status for this error kind.
    pub fn exit_status(&self) -> u8 {
        match self {
            AlgoblocksError::Io(_) => 1,
            AlgoblocksError::SettingsParse { .. }
            | AlgoblocksError::SettingsMissing { .. }
            | AlgoblocksError::SettingsInvalid { .. } => 2,
            AlgoblocksError::Database { .. }
            | AlgoblocksError::StrategyNotFound { .. }
            | AlgoblocksError::StrategyExists { .. } => 3,
            AlgoblocksError::InvalidConfig { .. } | AlgoblocksError::Json(_) => 4,
            AlgoblocksError::NoData { .. }
            | AlgoblocksError::MissingField { .. }
            | AlgoblocksError::InsufficientHistory { .. }
            | AlgoblocksError::InvalidSeries { .. }
            | AlgoblocksError::DataSource { .. } => 5,
        }
    }
}

impl From<&AlgoblocksError> for std::process::ExitCode {
    fn from(err: &AlgoblocksError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
