//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default countdown length and progress cadence
//! - Leaderboard size and per-fetch timeout
//! - First day of the week for weekly totals
//! - The signed-in account
//! - Log level
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::social::UserId;
use crate::stats::WeekStart;
use crate::timer::{Countdown, TICKS_PER_SECOND};

/// Countdown timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    /// Seconds between progress events while running.
    #[serde(default = "default_progress_every_secs")]
    pub progress_every_secs: u32,
}

/// Leaderboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    #[serde(default = "default_leaderboard_size")]
    pub size: usize,
    /// Give up on a single friend's total after this long. Unset waits
    /// indefinitely.
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
}

/// Statistics configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default)]
    pub week_start: WeekStart,
}

/// The account commands act as when `--user` is not given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_focus_minutes() -> u32 {
    25
}
fn default_progress_every_secs() -> u32 {
    1
}
fn default_leaderboard_size() -> usize {
    10
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            progress_every_secs: default_progress_every_secs(),
        }
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            size: default_leaderboard_size(),
            fetch_timeout_secs: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
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
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            if !obj.contains_key(part) {
                return Err(unknown());
            }
            if value == "none" && Self::nullable(key) {
                obj.insert(part.to_string(), serde_json::Value::Null);
                return Ok(());
            }
            let new_value = match &obj[part] {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Null if key == "leaderboard.fetch_timeout_secs" => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Null => serde_json::Value::String(value.into()),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                serde_json::Value::String(_) => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn nullable(key: &str) -> bool {
        matches!(key, "account.user_id" | "leaderboard.fetch_timeout_secs")
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content)?;
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

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// or fails validation, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Set a config value in memory only.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.timer.focus_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.focus_minutes".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.leaderboard.size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "leaderboard.size".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("using default config: {e}");
            Self::default()
        })
    }

    /// The configured default countdown.
    pub fn focus_countdown(&self) -> Result<Countdown> {
        Ok(Countdown::from_minutes(self.timer.focus_minutes)?)
    }

    /// Ticks between progress events.
    pub fn progress_every_ticks(&self) -> u64 {
        self.timer.progress_every_secs as u64 * TICKS_PER_SECOND as u64
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.account.user_id.as_deref().map(UserId::from)
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
        assert_eq!(parsed.timer.focus_minutes, 25);
        assert_eq!(parsed.leaderboard.size, 10);
        assert_eq!(parsed.leaderboard.fetch_timeout_secs, None);
        assert_eq!(parsed.stats.week_start, WeekStart::Monday);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[leaderboard]\nsize = 5\n").unwrap();
        assert_eq!(parsed.leaderboard.size, 5);
        assert_eq!(parsed.timer.focus_minutes, 25);
        assert_eq!(parsed.logging.level, "warn");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.focus_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("stats.week_start").as_deref(), Some("monday"));
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("timer.focus_minutes", "50").unwrap();
        cfg.apply("stats.week_start", "sunday").unwrap();
        cfg.apply("leaderboard.fetch_timeout_secs", "5").unwrap();
        cfg.apply("account.user_id", "ana").unwrap();
        assert_eq!(cfg.timer.focus_minutes, 50);
        assert_eq!(cfg.stats.week_start, WeekStart::Sunday);
        assert_eq!(cfg.leaderboard.fetch_timeout_secs, Some(5));
        assert_eq!(cfg.current_user(), Some(UserId::new("ana")));

        cfg.apply("leaderboard.fetch_timeout_secs", "none").unwrap();
        cfg.apply("account.user_id", "none").unwrap();
        assert_eq!(cfg.leaderboard.fetch_timeout_secs, None);
        assert_eq!(cfg.current_user(), None);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("timer.nonexistent_key", "1"),
            Err(crate::error::CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(cfg.apply("", "1").is_err());
    }

    #[test]
    fn apply_rejects_invalid_values() {
        let mut cfg = Config::default();
        assert!(cfg.apply("timer.focus_minutes", "soon").is_err());
        assert!(cfg.apply("timer.focus_minutes", "0").is_err());
        assert!(cfg.apply("stats.week_start", "friday").is_err());
        // Failed updates leave the config untouched.
        assert_eq!(cfg.timer.focus_minutes, 25);
        assert_eq!(cfg.stats.week_start, WeekStart::Monday);
    }

    #[test]
    fn progress_cadence_in_ticks() {
        let cfg = Config::default();
        assert_eq!(cfg.progress_every_ticks(), 100);
    }
}
