//! TOML-based application configuration.
//!
//! Stores tool preferences that are not part of the user's synced data:
//! - Database location override
//! - Streak scan window
//! - Trailing statistics window
//! - Log filter
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::stats::{StatsAnalyzer, DEFAULT_TRAILING_DAYS, MAX_TRAILING_DAYS};
use crate::streak::{StreakCalculator, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file to use instead of `<data_dir>/habitroom.db`.
    #[serde(default)]
    pub database_path: Option<String>,
}

/// Streak configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

/// Statistics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_trailing_days")]
    pub trailing_days: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `habitroom_core=debug`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}
fn default_trailing_days() -> u32 {
    DEFAULT_TRAILING_DAYS
}
fn default_log_filter() -> String {
    "warn".into()
}

fn check_days(key: &str, days: u32, max: u32) -> Result<(), ConfigError> {
    if (1..=max).contains(&days) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{days} is not between 1 and {max}"),
        })
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            trailing_days: default_trailing_days(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // Optional strings are serialized as null until set.
                    serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit file, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let next: Self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Check that the day windows are within their supported ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_days("streak.window_days", self.streak.window_days, MAX_WINDOW_DAYS)?;
        check_days("stats.trailing_days", self.stats.trailing_days, MAX_TRAILING_DAYS)
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Database path: the configured override or `<data_dir>/habitroom.db`.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match self.storage.database_path.as_deref() {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Ok(data_dir()?.join("habitroom.db")),
        }
    }

    pub fn streak_calculator(&self) -> StreakCalculator {
        StreakCalculator::with_window(self.streak.window_days)
    }

    pub fn stats_analyzer(&self) -> StatsAnalyzer {
        StatsAnalyzer::with_trailing_days(self.stats.trailing_days)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.streak.window_days, 365);
        assert_eq!(parsed.stats.trailing_days, 30);
        assert_eq!(parsed.log.filter, "warn");
        assert!(parsed.storage.database_path.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[streak]\nwindow_days = 90\n").unwrap();
        assert_eq!(parsed.streak.window_days, 90);
        assert_eq!(parsed.stats.trailing_days, 30);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("streak.window_days").as_deref(), Some("365"));
        assert_eq!(cfg.get("log.filter").as_deref(), Some("warn"));
        assert!(cfg.get("streak.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("stats.trailing_days", "14").unwrap();
        assert_eq!(cfg.stats.trailing_days, 14);
        assert_eq!(cfg.stats_analyzer().trailing_days, 14);
    }

    #[test]
    fn apply_sets_optional_string() {
        let mut cfg = Config::default();
        cfg.apply("storage.database_path", "/tmp/h.db").unwrap();
        assert_eq!(cfg.storage.database_path.as_deref(), Some("/tmp/h.db"));
        assert_eq!(cfg.database_path().unwrap(), PathBuf::from("/tmp/h.db"));
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("streak.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_invalid_number() {
        let mut cfg = Config::default();
        let result = cfg.apply("streak.window_days", "lots");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.streak.window_days, 365);
    }

    #[test]
    fn apply_rejects_out_of_range_windows() {
        let mut cfg = Config::default();
        for (key, value) in [
            ("streak.window_days", "0"),
            ("streak.window_days", "3651"),
            ("streak.window_days", "4294967295"),
            ("stats.trailing_days", "0"),
            ("stats.trailing_days", "100000"),
        ] {
            assert!(
                matches!(cfg.apply(key, value), Err(ConfigError::InvalidValue { .. })),
                "{key}={value}"
            );
        }
        assert_eq!(cfg.streak.window_days, 365);
        assert_eq!(cfg.stats.trailing_days, 30);

        cfg.apply("streak.window_days", "3650").unwrap();
        assert_eq!(cfg.streak_calculator().window_days, 3650);
    }

    #[test]
    fn oversized_file_values_are_capped() {
        let parsed: Config =
            toml::from_str("[streak]\nwindow_days = 4294967295\n[stats]\ntrailing_days = 4294967295\n")
                .unwrap();
        assert!(parsed.validate().is_err());
        assert_eq!(parsed.streak_calculator().window_days, MAX_WINDOW_DAYS);
        assert_eq!(parsed.stats_analyzer().trailing_days, MAX_TRAILING_DAYS);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.streak.window_days, 365);
        assert!(path.exists());

        let mut cfg = cfg;
        cfg.apply("log.filter", "debug").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().log.filter, "debug");
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "streak = 'nope'").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
