//! INI file configuration adapter.
//!
//! Recognised sections are `[input]`, `[strategy]` and `[chart]`; keys match
//! the long command-line flag names with underscores.

use crate::domain::error::TrendplotError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrendplotError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| TrendplotError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TrendplotError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TrendplotError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// An adapter with no sections, for runs without a config file.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

fn invalid(section: &str, key: &str, reason: String) -> TrendplotError {
    TrendplotError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .filter(|v| !v.trim().is_empty())
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, TrendplotError> {
        self.config
            .getint(section, key)
            .map_err(|reason| invalid(section, key, reason))
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, TrendplotError> {
        let value = self
            .config
            .getfloat(section, key)
            .map_err(|reason| invalid(section, key, reason))?;
        match value {
            Some(v) if !v.is_finite() => Err(invalid(section, key, format!("{v} is not finite"))),
            other => Ok(other),
        }
    }

    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, TrendplotError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(value) => Self::parse_bool(&value).map(Some).ok_or_else(|| {
                invalid(section, key, format!("'{value}' is not a boolean"))
            }),
        }
    }
}
