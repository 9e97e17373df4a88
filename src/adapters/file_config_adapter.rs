//! INI file settings adapter.

use crate::domain::error::AlgoblocksError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AlgoblocksError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| AlgoblocksError::SettingsParse {
                file: path.display().to_string(),
                reason,
            })?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, AlgoblocksError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| AlgoblocksError::SettingsParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// Adapter with no sections; every lookup falls back to defaults.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::config_port::parse_bool;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[engine]
default_ticker = MSFT
data_dir = /var/lib/bars

[strategy]
ticker = TSLA
ma_period = 20
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("engine", "data_dir"),
            Some("/var/lib/bars".to_string())
        );
        assert_eq!(
            adapter.get_string("strategy", "ticker"),
            Some("TSLA".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nlookback = 1y\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_parses_value() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nrsi_period = 14\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "rsi_period").unwrap(), Some(14));
        assert_eq!(adapter.get_int("strategy", "missing").unwrap(), None);
    }

    #[test]
    fn get_int_rejects_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nrsi_period = abc\n").unwrap();
        let err = adapter.get_int("strategy", "rsi_period").unwrap_err();
        assert!(matches!(err, AlgoblocksError::SettingsInvalid { .. }));
    }

    #[test]
    fn get_double_parses_value() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\nannualization_factor = 252.5\n").unwrap();
        assert_eq!(
            adapter.get_double("backtest", "annualization_factor").unwrap(),
            Some(252.5)
        );
    }

    #[test]
    fn get_double_rejects_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\nannualization_factor = x\n").unwrap();
        assert!(adapter.get_double("backtest", "annualization_factor").is_err());
    }

    #[test]
    fn flag_values_parse() {
        let adapter = FileConfigAdapter::from_string(
            "[strategy]\na = true\nb = yes\nc = 1\nd = false\ne = no\nf = 0\ng = maybe\n",
        )
        .unwrap();
        let flag = |key: &str| adapter.get_string("strategy", key).and_then(|v| parse_bool(&v));
        for key in ["a", "b", "c"] {
            assert_eq!(flag(key), Some(true));
        }
        for key in ["d", "e", "f"] {
            assert_eq!(flag(key), Some(false));
        }
        assert_eq!(flag("g"), None);
        assert_eq!(flag("missing"), None);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[store]\npath = /tmp/strategies.db\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("store", "path"),
            Some("/tmp/strategies.db".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").unwrap_err();
        assert!(matches!(err, AlgoblocksError::SettingsParse { .. }));
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn empty_adapter_has_no_values() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("engine", "default_ticker"), None);
    }

    #[test]
    fn adapter_debug_output() {
        let adapter = FileConfigAdapter::from_string("[engine]\ndefault_ticker = spy\n").unwrap();
        assert!(format!("{:?}", adapter).starts_with("FileConfigAdapter"));
    }
}
