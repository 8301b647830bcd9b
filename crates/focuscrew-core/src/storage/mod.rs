mod config;
pub mod database;
pub mod migrations;
mod social;

pub use config::{AccountConfig, Config, LeaderboardConfig, LoggingConfig, StatsConfig, TimerConfig};
pub use database::{Database, SessionRecord};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding `config.toml` and `focuscrew.db`.
///
/// `FOCUSCREW_DATA_DIR` wins if set. Otherwise `~/.config/focuscrew[-dev]/`,
/// picked by `FOCUSCREW_ENV` (set it to `dev` for the development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FOCUSCREW_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSCREW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focuscrew-dev")
            } else {
                base_dir.join("focuscrew")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
