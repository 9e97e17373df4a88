//! Settings access port trait.
//!
//! Adapters only provide raw string lookup; typed accessors parse on top of
//! it so a malformed value is reported instead of silently replaced by a
//! default.

use crate::domain::error::AlgoblocksError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, AlgoblocksError> {
        self.get_string(section, key)
            .map(|raw| {
                raw.trim().parse::<i64>().map_err(|_| {
                    AlgoblocksError::settings_invalid(
                        section,
                        key,
                        format!("expected an integer, got '{}'", raw),
                    )
                })
            })
            .transpose()
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, AlgoblocksError> {
        self.get_string(section, key)
            .map(|raw| {
                raw.trim().parse::<f64>().map_err(|_| {
                    AlgoblocksError::settings_invalid(
                        section,
                        key,
                        format!("expected a number, got '{}'", raw),
                    )
                })
            })
            .transpose()
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
